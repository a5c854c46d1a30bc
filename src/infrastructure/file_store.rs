// JSON file storage for datasource maps and datasets
use crate::application::map_store::{dataset_key, map_key, DatasetStore, MapStore};
use crate::domain::plant::Plant;
use crate::domain::signal::{DatasourceMap, Table};
use crate::domain::time_series::{TimeSeriesTable, TimeWindow};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    maps_dir: PathBuf,
    data_dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(maps_dir: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            data_dir: data_dir.into(),
        }
    }

    fn map_path(&self, plant: &Plant, table: Table) -> PathBuf {
        self.maps_dir.join(format!("{}_map.json", map_key(plant, table)))
    }
}

/// Pretty-print `value` to `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
            tracing::info!("Creating directory: {}", parent.display());
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    let body = serde_json::to_string_pretty(value)?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Saved {}", path.display());
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("Failed to parse {}", path.display()))
}

impl MapStore for JsonFileStore {
    fn load_map(&self, plant: &Plant, table: Table) -> Result<Option<DatasourceMap>> {
        let path = self.map_path(plant, table);
        if !path.exists() {
            return Ok(None);
        }
        let map = read_json(&path)?;
        tracing::info!("Loaded sources map from {}", path.display());
        Ok(Some(map))
    }

    fn save_map(&self, plant: &Plant, table: Table, map: &DatasourceMap) -> Result<PathBuf> {
        let path = self.map_path(plant, table);
        write_json(&path, map)?;
        Ok(path)
    }
}

impl DatasetStore for JsonFileStore {
    fn save_dataset(&self, plant: &Plant, table: Table, window: &TimeWindow, rows: &TimeSeriesTable) -> Result<PathBuf> {
        let path = self
            .data_dir
            .join(format!("{}.json", dataset_key(plant, table, window)));
        write_json(&path, rows)?;
        Ok(path)
    }
}
