// Repository trait for the vendor monitoring platform
use crate::domain::equipment::{ElementId, Equipment};
use crate::domain::plant::{Plant, PlantId};
use crate::domain::signal::{DatasourceDescriptor, DatasourceId};
use crate::domain::time_series::{Aggregation, RawPoint, TimeWindow};
use async_trait::async_trait;

/// Parameters of one data-list call.
#[derive(Debug, Clone, PartialEq)]
pub struct DataListRequest {
    pub datasource_ids: Vec<DatasourceId>,
    pub window: TimeWindow,
    pub grouping: String,
    pub granularity: u32,
    pub aggregation: Aggregation,
}

#[async_trait]
pub trait MonitoringRepository: Send + Sync {
    /// Check the platform is reachable and the credentials are accepted
    async fn ping(&self) -> anyhow::Result<()>;

    async fn list_plants(&self) -> anyhow::Result<Vec<Plant>>;

    /// Vendor record of one plant, passed through untouched
    async fn plant_detail(&self, plant_id: PlantId) -> anyhow::Result<serde_json::Value>;

    /// Every element of a plant, categorized from its vendor type label
    async fn list_equipment(&self, plant_id: PlantId) -> anyhow::Result<Vec<Equipment>>;

    async fn element_detail(&self, plant_id: PlantId, element_id: ElementId) -> anyhow::Result<serde_json::Value>;

    /// Telemetry channels of one element, in response order
    async fn list_datasources(
        &self,
        plant_id: PlantId,
        element_id: ElementId,
    ) -> anyhow::Result<Vec<DatasourceDescriptor>>;

    /// Telemetry channels of every element of a plant
    async fn list_plant_datasources(&self, plant_id: PlantId) -> anyhow::Result<Vec<DatasourceDescriptor>>;

    /// Raw triples for at most `max_ids_per_request` datasources
    async fn fetch_data_list(&self, request: &DataListRequest) -> anyhow::Result<Vec<RawPoint>>;

    /// Vendor-imposed limit on ids per data-list call
    fn max_ids_per_request(&self) -> usize;
}
