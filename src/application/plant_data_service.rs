// Plant data service - Use case for building maps and collecting datasets
use crate::application::map_builder::DatasourceMapBuilder;
use crate::application::map_store::{DatasetStore, MapStore};
use crate::application::monitoring_repository::{DataListRequest, MonitoringRepository};
use crate::application::reconciler::{join, relabel};
use crate::domain::error::{DiscoveryError, PlantLookup};
use crate::domain::plant::Plant;
use crate::domain::signal::{DatasourceId, DatasourceMap, Table};
use crate::domain::time_series::{Aggregation, TimeSeriesTable, TimeWindow};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataListSettings {
    pub batch_size: usize,
    pub grouping: String,
    pub granularity: u32,
}

impl Default for DataListSettings {
    fn default() -> Self {
        Self {
            batch_size: 10,
            grouping: "minute".to_string(),
            granularity: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub gen_path: PathBuf,
    pub weather_path: PathBuf,
}

#[derive(Clone)]
pub struct PlantDataService {
    repository: Arc<dyn MonitoringRepository>,
    builder: DatasourceMapBuilder,
    maps: Arc<dyn MapStore>,
    datasets: Arc<dyn DatasetStore>,
    settings: DataListSettings,
}

impl PlantDataService {
    pub fn new(
        repository: Arc<dyn MonitoringRepository>,
        builder: DatasourceMapBuilder,
        maps: Arc<dyn MapStore>,
        datasets: Arc<dyn DatasetStore>,
        settings: DataListSettings,
    ) -> Self {
        Self {
            repository,
            builder,
            maps,
            datasets,
            settings,
        }
    }

    pub async fn find_plant(&self, lookup: PlantLookup) -> Result<Plant, DiscoveryError> {
        let plants = self.repository.list_plants().await?;
        let plant = match &lookup {
            PlantLookup::Id(id) => plants.into_iter().find(|p| p.id == *id),
            PlantLookup::SafeName(name) => plants.into_iter().find(|p| p.matches_safe_name(name)),
        };
        plant.ok_or(DiscoveryError::PlantNotFound(lookup))
    }

    /// Run discovery and overwrite whatever map was stored before.
    pub async fn rebuild_map(&self, plant: &Plant, table: Table) -> Result<(DatasourceMap, PathBuf), DiscoveryError> {
        let map = self.builder.build(plant.id, table).await?;
        let path = self.maps.save_map(plant, table, &map)?;
        tracing::info!("Datasources map saved for plant {} in {}", plant.name, path.display());
        Ok((map, path))
    }

    pub async fn load_or_build_map(&self, plant: &Plant, table: Table) -> Result<DatasourceMap, DiscoveryError> {
        if let Some(map) = self.maps.load_map(plant, table)? {
            tracing::info!("{} datasources map loaded for plant {}", table, plant.name);
            return Ok(map);
        }
        tracing::info!("{} datasources map not found for plant {}, creating it...", table, plant.name);
        let (map, _) = self.rebuild_map(plant, table).await?;
        Ok(map)
    }

    /// Fetch every datasource of the map over the window and reconcile into one table.
    pub async fn collect(&self, map: &DatasourceMap, table: Table, window: &TimeWindow) -> Result<TimeSeriesTable, DiscoveryError> {
        let groups = match table {
            // Power is averaged over each slot, energy counters are summed.
            Table::Gen => vec![
                (map.datasource_ids_named_like("power"), Aggregation::Average),
                (map.datasource_ids_named_like("energy"), Aggregation::Sum),
            ],
            Table::Weather => vec![(map.datasource_ids(), Aggregation::Average)],
        };

        let mut tables = Vec::new();
        for (ids, aggregation) in groups {
            tables.extend(self.fetch_batched(&ids, map, window, aggregation).await?);
        }
        Ok(join(tables))
    }

    async fn fetch_batched(
        &self,
        ids: &[DatasourceId],
        map: &DatasourceMap,
        window: &TimeWindow,
        aggregation: Aggregation,
    ) -> Result<Vec<TimeSeriesTable>, DiscoveryError> {
        let batch_size = self
            .settings
            .batch_size
            .min(self.repository.max_ids_per_request())
            .max(1);

        let mut tables = Vec::new();
        for batch in ids.chunks(batch_size) {
            let request = DataListRequest {
                datasource_ids: batch.to_vec(),
                window: window.clone(),
                grouping: self.settings.grouping.clone(),
                granularity: self.settings.granularity,
                aggregation,
            };
            let points = self.repository.fetch_data_list(&request).await?;
            tracing::debug!("Fetched {} points for {} datasources", points.len(), batch.len());
            tables.push(relabel(&points, map));
        }
        Ok(tables)
    }

    /// Load (or discover) both maps, then collect and save the gen and weather datasets.
    pub async fn run(&self, plant: &Plant, window: &TimeWindow) -> Result<PipelineOutput, DiscoveryError> {
        tracing::info!("Starting data pipeline for plant {}", plant.name);

        let gen_map = self.load_or_build_map(plant, Table::Gen).await?;
        let weather_map = self.load_or_build_map(plant, Table::Weather).await?;

        let gen_rows = self.collect(&gen_map, Table::Gen, window).await?;
        let gen_path = self.datasets.save_dataset(plant, Table::Gen, window, &gen_rows)?;

        let weather_rows = self.collect(&weather_map, Table::Weather, window).await?;
        let weather_path = self.datasets.save_dataset(plant, Table::Weather, window, &weather_rows)?;

        tracing::info!("Data pipeline completed for plant {}", plant.name);
        Ok(PipelineOutput { gen_path, weather_path })
    }
}
