// Built-in pattern catalog - Matched case-insensitively, list order is priority
use crate::application::classifier::{pattern_set, MatchMode, RuleSet};
use crate::application::signal_extractor::SignalPattern;
use crate::domain::equipment::EquipmentCategory;
use crate::domain::signal::SignalKind;

/// Element type labels (full match).
pub const CATEGORY_PATTERNS: &[(&str, EquipmentCategory)] = &[
    (r"inverter|inversor", EquipmentCategory::Inverter),
    (r"meter|medidor", EquipmentCategory::Meter),
    (r"string", EquipmentCategory::String),
    (r"weather\s*station|meteo", EquipmentCategory::WeatherStation),
];

/// Inverter names, capturing (container, inverter). Searched anywhere in the name.
pub const INVERTER_HIERARCHY_PATTERNS: &[&str] = &[
    r"CT(\d+)\.(\d+)",
    r"Inverter\s+(\d+)\.(\d+)",
    r"INV-(\d+)\.(\d+)",
];

/// String names, capturing (container, inverter, string). Anchored at the start.
pub const STRING_HIERARCHY_PATTERNS: &[&str] = &[
    r"String\s*CT(\d+)\.(\d+)\.(\d+)",
    r"String\s*CT(\d+)\.(\d+)\s+(\d+)",
    r"String\s*(\d+)\.(\d+)\.(\d+)",
    r"String\s*-?\s*(\d+)\.(\d+)\s+(\d+)",
];

/// Weather station names, optionally capturing the container. Anchored at the start.
pub const WEATHER_STATION_PATTERNS: &[&str] = &[
    r"Weather\s*Station\s*CT(\d+)",
    r"Meteo\s+CT(\d+)",
    r"\bws\b",
];

pub const ACTIVE_POWER_NAME_PATTERNS: &[&str] = &[
    r"active\s*power",
    r"\bPower\b",
    r"^Active\s+Power\s+Total\s+\(kw\)",
];
pub const ACTIVE_POWER_UNIT_PATTERNS: &[&str] = &[r"\bkw\b"];

pub const ACTIVE_ENERGY_NAME_PATTERNS: &[&str] = &[
    r"active\s*energy",
    r"^energy$",
    r"\bexported\s*active\s*energy\b",
];
pub const ACTIVE_ENERGY_UNIT_PATTERNS: &[&str] = &[r"\bkwh\b"];

/// Weather datasource names, searched anywhere. RPOA must not be caught by POA,
/// the leading word boundary takes care of that.
pub const WEATHER_KIND_PATTERNS: &[(&str, SignalKind)] = &[
    (r"\bGHI Irradiance", SignalKind::GhiIrradiance),
    (r"\bPOA\s*Irradiance", SignalKind::PoaIrradiance),
    (r"\bRPOA\s*Irradiance", SignalKind::RearPoaIrradiance),
    (r"\bPOA\s*Internal\s*Temp", SignalKind::PanelTemperature),
    (r"Soiling Clean", SignalKind::SoilingClean),
    (r"Soiling Soiled", SignalKind::SoilingDirty),
];

/// Every rule set discovery needs, compiled once.
#[derive(Debug, Clone)]
pub struct PatternCatalog {
    pub categories: RuleSet<EquipmentCategory>,
    pub inverter_hierarchy: RuleSet<()>,
    pub string_hierarchy: RuleSet<()>,
    pub weather_stations: RuleSet<()>,
    pub active_power: SignalPattern,
    pub active_energy: SignalPattern,
    pub weather_kinds: RuleSet<SignalKind>,
}

impl PatternCatalog {
    pub fn builtin() -> Result<Self, regex::Error> {
        Ok(Self {
            categories: RuleSet::compile(MatchMode::Full, CATEGORY_PATTERNS)?,
            inverter_hierarchy: pattern_set(MatchMode::Anywhere, INVERTER_HIERARCHY_PATTERNS)?,
            string_hierarchy: pattern_set(MatchMode::Prefix, STRING_HIERARCHY_PATTERNS)?,
            weather_stations: pattern_set(MatchMode::Prefix, WEATHER_STATION_PATTERNS)?,
            active_power: SignalPattern::compile(ACTIVE_POWER_NAME_PATTERNS, ACTIVE_POWER_UNIT_PATTERNS)?,
            active_energy: SignalPattern::compile(ACTIVE_ENERGY_NAME_PATTERNS, ACTIVE_ENERGY_UNIT_PATTERNS)?,
            weather_kinds: RuleSet::compile(MatchMode::Anywhere, WEATHER_KIND_PATTERNS)?,
        })
    }

    /// Name/unit pattern pair for the single-valued signals.
    pub fn signal_pattern(&self, kind: SignalKind) -> Option<&SignalPattern> {
        match kind {
            SignalKind::ActivePower => Some(&self.active_power),
            SignalKind::ActiveEnergy => Some(&self.active_energy),
            _ => None,
        }
    }

    /// Category for a vendor type label; unknown labels become `Other`.
    pub fn categorize(&self, type_label: &str) -> EquipmentCategory {
        match self.categories.classify(type_label) {
            Some(hit) => hit.outcome,
            None => {
                tracing::debug!("No category pattern matched type label: {}", type_label);
                EquipmentCategory::Other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_compiles() {
        let catalog = PatternCatalog::builtin().unwrap();
        assert_eq!(catalog.inverter_hierarchy.len(), 3);
        assert_eq!(catalog.weather_kinds.len(), 6);
    }

    #[test]
    fn test_categorize_type_labels() {
        let catalog = PatternCatalog::builtin().unwrap();
        assert_eq!(catalog.categorize("Inversor"), EquipmentCategory::Inverter);
        assert_eq!(catalog.categorize("INVERTER"), EquipmentCategory::Inverter);
        assert_eq!(catalog.categorize("Medidor"), EquipmentCategory::Meter);
        assert_eq!(catalog.categorize("String"), EquipmentCategory::String);
        assert_eq!(catalog.categorize("Weather Station"), EquipmentCategory::WeatherStation);
        assert_eq!(catalog.categorize("Transformer"), EquipmentCategory::Other);
        // Full match only
        assert_eq!(catalog.categorize("String box"), EquipmentCategory::Other);
    }

    #[test]
    fn test_weather_kinds_keep_rpoa_apart() {
        let catalog = PatternCatalog::builtin().unwrap();
        let kind = |name: &str| catalog.weather_kinds.classify(name).map(|c| c.outcome);

        assert_eq!(kind("GHI Irradiance"), Some(SignalKind::GhiIrradiance));
        assert_eq!(kind("POA Irradiance 1"), Some(SignalKind::PoaIrradiance));
        assert_eq!(kind("RPOA Irradiance"), Some(SignalKind::RearPoaIrradiance));
        assert_eq!(kind("POA Internal Temperature"), Some(SignalKind::PanelTemperature));
        assert_eq!(kind("Soiling Clean Cell"), Some(SignalKind::SoilingClean));
        assert_eq!(kind("Soiling Soiled Cell"), Some(SignalKind::SoilingDirty));
        assert_eq!(kind("Wind Speed"), None);
    }

    #[test]
    fn test_weather_station_names() {
        let catalog = PatternCatalog::builtin().unwrap();
        let hit = catalog.weather_stations.classify("Weather Station CT2").unwrap();
        assert_eq!(hit.indices, vec![2]);

        let hit = catalog.weather_stations.classify("WS main").unwrap();
        assert!(hit.indices.is_empty());

        assert!(catalog.weather_stations.classify("Inverter 1.1").is_none());
    }
}
