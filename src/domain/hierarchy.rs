// Physical hierarchy of a plant: containers (CTs) holding numbered units
use super::error::DiscoveryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyIndex {
    pub container: u32,
    pub sub: u32,
    pub leaf: Option<u32>,
}

impl HierarchyIndex {
    pub fn new(container: u32, sub: u32, leaf: Option<u32>) -> Self {
        Self { container, sub, leaf }
    }
}

/// Numbering layout inferred from every name of one category in a plant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Topology {
    /// Distinct sub-indices seen per container; position 0 is container 1.
    pub counts_per_container: Vec<u32>,
    /// False when sub-indices keep counting across containers (2.3, 2.4 after 1.1, 1.2).
    pub resets_per_container: bool,
}

impl Topology {
    pub fn new(counts_per_container: Vec<u32>, resets_per_container: bool) -> Self {
        Self {
            counts_per_container,
            resets_per_container,
        }
    }

    pub fn count_for(&self, container: u32) -> u32 {
        container
            .checked_sub(1)
            .and_then(|i| self.counts_per_container.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Units numbered in the containers before this one.
    pub fn offset_for(&self, container: u32) -> u32 {
        let prior = container.saturating_sub(1) as usize;
        self.counts_per_container.iter().take(prior).sum()
    }

    /// Bring a raw index into per-container numbering and check it is in range.
    pub fn normalize(&self, index: HierarchyIndex, raw_name: &str) -> Result<HierarchyIndex, DiscoveryError> {
        let count = self.count_for(index.container);
        if count == 0 {
            return Err(DiscoveryError::TopologyViolation {
                raw_name: raw_name.to_string(),
                container: index.container,
                sub_index: i64::from(index.sub),
                reason: "container has no known units".to_string(),
            });
        }

        let sub = if self.resets_per_container {
            i64::from(index.sub)
        } else {
            i64::from(index.sub) - i64::from(self.offset_for(index.container))
        };

        if sub < 1 || sub > i64::from(count) {
            return Err(DiscoveryError::TopologyViolation {
                raw_name: raw_name.to_string(),
                container: index.container,
                sub_index: sub,
                reason: format!("expected 1..={}", count),
            });
        }

        Ok(HierarchyIndex::new(index.container, sub as u32, index.leaf))
    }
}
