// Persistence traits for discovery output and reconciled datasets
use crate::domain::plant::Plant;
use crate::domain::signal::{DatasourceMap, Table};
use crate::domain::time_series::{TimeSeriesTable, TimeWindow};
use std::path::PathBuf;

/// Document key of a datasource map: `<safe_name>_<table>`.
pub fn map_key(plant: &Plant, table: Table) -> String {
    format!("{}_{}", plant.safe_name, table)
}

/// Document key of a dataset: `<safe_name>_<table>_<start>_<end>`.
pub fn dataset_key(plant: &Plant, table: Table, window: &TimeWindow) -> String {
    format!("{}_{}", map_key(plant, table), window.file_tag())
}

pub trait MapStore: Send + Sync {
    /// `None` when no map has been saved for this (plant, table) yet
    fn load_map(&self, plant: &Plant, table: Table) -> anyhow::Result<Option<DatasourceMap>>;

    fn save_map(&self, plant: &Plant, table: Table, map: &DatasourceMap) -> anyhow::Result<PathBuf>;
}

pub trait DatasetStore: Send + Sync {
    fn save_dataset(
        &self,
        plant: &Plant,
        table: Table,
        window: &TimeWindow,
        rows: &TimeSeriesTable,
    ) -> anyhow::Result<PathBuf>;
}
