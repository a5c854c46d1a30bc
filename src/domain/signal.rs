// Datasource (telemetry channel) domain models
use super::equipment::ElementId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub type DatasourceId = i64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasourceDescriptor {
    pub id: DatasourceId,
    pub name: String,
    pub unit: String,
}

impl DatasourceDescriptor {
    pub fn new(id: DatasourceId, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            unit: unit.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    ActivePower,
    ActiveEnergy,
    GhiIrradiance,
    PoaIrradiance,
    RearPoaIrradiance,
    PanelTemperature,
    SoilingClean,
    SoilingDirty,
}

impl SignalKind {
    /// Suffix used in weather canonical names, `ct01_<suffix>`.
    pub fn weather_suffix(&self) -> Option<&'static str> {
        match self {
            SignalKind::GhiIrradiance => Some("pyr1_h"),
            SignalKind::PoaIrradiance => Some("albedo1_up"),
            SignalKind::RearPoaIrradiance => Some("albedo1_down"),
            SignalKind::PanelTemperature => Some("temp_p1"),
            SignalKind::SoilingClean => Some("clean_cell1"),
            SignalKind::SoilingDirty => Some("dirty_cell1"),
            SignalKind::ActivePower | SignalKind::ActiveEnergy => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::ActivePower => "active_power",
            SignalKind::ActiveEnergy => "active_energy",
            SignalKind::GhiIrradiance => "ghi_irradiance",
            SignalKind::PoaIrradiance => "poa_irradiance",
            SignalKind::RearPoaIrradiance => "rear_poa_irradiance",
            SignalKind::PanelTemperature => "panel_temperature",
            SignalKind::SoilingClean => "soiling_clean",
            SignalKind::SoilingDirty => "soiling_dirty",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active_power" => Ok(SignalKind::ActivePower),
            "active_energy" => Ok(SignalKind::ActiveEnergy),
            other => Err(format!("unsupported signal type: {}", other)),
        }
    }
}

/// Which output table a map (and a dataset) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Gen,
    Weather,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Gen => "gen",
            Table::Weather => "weather",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gen" => Ok(Table::Gen),
            "weather" => Ok(Table::Weather),
            other => Err(format!("invalid table '{}', expected 'gen' or 'weather'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalMapEntry {
    #[serde(rename = "name")]
    pub canonical_name: String,
    pub element_id: ElementId,
    pub datasource_id: DatasourceId,
    pub datasource_name: String,
    pub datasource_unit: String,
}

impl SignalMapEntry {
    pub fn new(canonical_name: impl Into<String>, element_id: ElementId, source: &DatasourceDescriptor) -> Self {
        Self {
            canonical_name: canonical_name.into(),
            element_id,
            datasource_id: source.id,
            datasource_name: source.name.clone(),
            datasource_unit: source.unit.clone(),
        }
    }
}

/// Canonical name -> vendor datasource map for one (plant, table).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DatasourceMap {
    entries: Vec<SignalMapEntry>,
}

impl DatasourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A second entry under an existing canonical name replaces
    /// the first in place.
    pub fn insert(&mut self, entry: SignalMapEntry) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.canonical_name == entry.canonical_name)
        {
            Some(existing) => {
                tracing::warn!(
                    "Canonical name {} already mapped to datasource {}, overwritten by {}",
                    existing.canonical_name,
                    existing.datasource_id,
                    entry.datasource_id
                );
                *existing = entry;
            }
            None => self.entries.push(entry),
        }
    }

    pub fn entries(&self) -> &[SignalMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name_by_datasource(&self) -> HashMap<DatasourceId, &str> {
        self.entries
            .iter()
            .map(|e| (e.datasource_id, e.canonical_name.as_str()))
            .collect()
    }

    /// Datasource ids whose vendor name contains `needle`, ignoring case.
    pub fn datasource_ids_named_like(&self, needle: &str) -> Vec<DatasourceId> {
        let needle = needle.to_lowercase();
        self.entries
            .iter()
            .filter(|e| e.datasource_name.to_lowercase().contains(&needle))
            .map(|e| e.datasource_id)
            .collect()
    }

    pub fn datasource_ids(&self) -> Vec<DatasourceId> {
        self.entries.iter().map(|e| e.datasource_id).collect()
    }
}
