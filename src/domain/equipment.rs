// Equipment domain model
use serde::{Deserialize, Serialize};
use std::fmt;

pub type ElementId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCategory {
    Inverter,
    Meter,
    String,
    WeatherStation,
    Other,
}

impl EquipmentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentCategory::Inverter => "inverter",
            EquipmentCategory::Meter => "meter",
            EquipmentCategory::String => "string",
            EquipmentCategory::WeatherStation => "weather-station",
            EquipmentCategory::Other => "other",
        }
    }
}

impl fmt::Display for EquipmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element of a plant as listed by the monitoring platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: ElementId,
    pub name: String,
    /// Vendor type label the category was derived from, e.g. "Inversor".
    pub type_label: String,
    pub category: EquipmentCategory,
}

impl Equipment {
    pub fn new(id: ElementId, name: String, type_label: String, category: EquipmentCategory) -> Self {
        Self {
            id,
            name,
            type_label,
            category,
        }
    }
}

/// Filter a plant listing down to one category, keeping listing order.
pub fn of_category(equipment: &[Equipment], category: EquipmentCategory) -> Vec<&Equipment> {
    equipment.iter().filter(|e| e.category == category).collect()
}
