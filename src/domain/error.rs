// Discovery and reconciliation errors
use super::equipment::EquipmentCategory;
use super::plant::PlantId;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("no {0} equipment found in the plant's elements")]
    MissingCategory(EquipmentCategory),

    #[error("invalid sub-index {sub_index} for container {container} ({reason}) while processing '{raw_name}'")]
    TopologyViolation {
        raw_name: String,
        container: u32,
        sub_index: i64,
        reason: String,
    },

    #[error("no plant found with {0}")]
    PlantNotFound(PlantLookup),

    #[error("invalid time window: {0}")]
    InvalidWindow(String),

    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error(transparent)]
    Repository(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantLookup {
    Id(PlantId),
    SafeName(String),
}

impl std::fmt::Display for PlantLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlantLookup::Id(id) => write!(f, "id={}", id),
            PlantLookup::SafeName(name) => write!(f, "safe_name='{}'", name),
        }
    }
}
