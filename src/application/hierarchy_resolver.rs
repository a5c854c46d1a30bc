// Hierarchy resolver - Canonical names from vendor equipment names
use crate::application::classifier::RuleSet;
use crate::domain::error::DiscoveryError;
use crate::domain::hierarchy::{HierarchyIndex, Topology};
use std::collections::{BTreeMap, BTreeSet};

/// Category-specific layout of a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameFormat {
    /// `ct01_inv02`
    Inverter,
    /// `ct01_02_str03`
    String,
}

impl NameFormat {
    fn render(&self, index: HierarchyIndex) -> Option<String> {
        match self {
            NameFormat::Inverter => Some(format!("ct{:02}_inv{:02}", index.container, index.sub)),
            NameFormat::String => index
                .leaf
                .map(|leaf| format!("ct{:02}_{:02}_str{:02}", index.container, index.sub, leaf)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyInference {
    pub topology: Topology,
    /// Names no hierarchy pattern could place; left out of the inference.
    pub unmatched: Vec<String>,
}

/// Hierarchy coordinates of a name, from the first pattern that matches.
pub fn parse_index(name: &str, patterns: &RuleSet<()>) -> Option<HierarchyIndex> {
    let hit = patterns.classify(name)?;
    match hit.indices.as_slice() {
        [container, sub] if *container > 0 => Some(HierarchyIndex::new(*container, *sub, None)),
        [container, sub, leaf, ..] if *container > 0 => {
            Some(HierarchyIndex::new(*container, *sub, Some(*leaf)))
        }
        _ => None,
    }
}

/// Infer counts per container and the reset policy from every name of a category.
///
/// Vendors number inverters either per container ("CT2.1" is the first
/// inverter of container 2) or continuously across the plant ("CT2.3" after
/// "CT1.1", "CT1.2").
pub fn infer_topology<S: AsRef<str>>(names: &[S], patterns: &RuleSet<()>) -> TopologyInference {
    let mut seen: BTreeMap<u32, BTreeSet<u32>> = BTreeMap::new();
    let mut indices = Vec::new();
    let mut unmatched = Vec::new();

    for name in names {
        let name = name.as_ref();
        match parse_index(name, patterns) {
            Some(index) => {
                seen.entry(index.container).or_default().insert(index.sub);
                indices.push(index);
            }
            None => {
                tracing::warn!("No container index found for name: {}", name);
                unmatched.push(name.to_string());
            }
        }
    }

    let containers = seen.keys().next_back().copied().unwrap_or(0);
    let counts_per_container: Vec<u32> = (1..=containers)
        .map(|c| seen.get(&c).map(|subs| subs.len() as u32).unwrap_or(0))
        .collect();

    let topology = Topology::new(counts_per_container, true);
    // A sub-index beyond its own container's count means numbering continues
    // from the previous containers.
    let continuous = indices
        .iter()
        .any(|index| index.sub > topology.count_for(index.container));

    TopologyInference {
        topology: Topology {
            resets_per_container: !continuous,
            ..topology
        },
        unmatched,
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyResolver {
    topology: Topology,
}

impl HierarchyResolver {
    pub fn new(topology: Topology) -> Self {
        Self { topology }
    }

    /// Canonical name for `raw_name`. Names no pattern matches come back
    /// unchanged; out of range indices are a `TopologyViolation`.
    pub fn canonicalize(
        &self,
        raw_name: &str,
        patterns: &RuleSet<()>,
        format: NameFormat,
    ) -> Result<String, DiscoveryError> {
        let Some(index) = parse_index(raw_name, patterns) else {
            tracing::warn!("No pattern matched for name: {}", raw_name);
            return Ok(raw_name.to_string());
        };

        let normalized = self.topology.normalize(index, raw_name)?;
        match format.render(normalized) {
            Some(name) => {
                tracing::debug!("Formatted {} -> {}", raw_name, name);
                Ok(name)
            }
            None => {
                tracing::warn!("Name {} lacks the indices its format needs", raw_name);
                Ok(raw_name.to_string())
            }
        }
    }
}
