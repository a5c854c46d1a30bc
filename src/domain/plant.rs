// Plant domain model
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub type PlantId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub safe_name: String,
}

impl Plant {
    pub fn new(id: PlantId, name: String) -> Self {
        let safe_name = Self::format_safe_name(&name);
        Self {
            id,
            name,
            safe_name,
        }
    }

    /// Filesystem-safe key for a plant: "Planta Sevilla-Norte" -> "Planta_Sevilla_Norte"
    fn format_safe_name(name: &str) -> String {
        name.nfkd()
            .filter(|c| !is_combining_mark(*c))
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect()
    }

    pub fn matches_safe_name(&self, safe_name: &str) -> bool {
        self.safe_name.eq_ignore_ascii_case(safe_name)
    }
}
