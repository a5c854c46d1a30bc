// In-memory repository and stores for tests
use crate::application::map_store::{dataset_key, map_key, DatasetStore, MapStore};
use crate::application::monitoring_repository::{DataListRequest, MonitoringRepository};
use crate::domain::equipment::{ElementId, Equipment, EquipmentCategory};
use crate::domain::plant::{Plant, PlantId};
use crate::domain::signal::{DatasourceDescriptor, DatasourceId, DatasourceMap, Table};
use crate::domain::time_series::{RawPoint, TimeSeriesTable, TimeWindow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct InMemoryRepository {
    pub plants: Vec<Plant>,
    pub equipment: HashMap<PlantId, Vec<Equipment>>,
    pub datasources: HashMap<ElementId, Vec<DatasourceDescriptor>>,
    pub points: HashMap<DatasourceId, Vec<RawPoint>>,
    pub max_ids: usize,
    pub datasource_calls: AtomicUsize,
    pub data_list_requests: Mutex<Vec<DataListRequest>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            plants: Vec::new(),
            equipment: HashMap::new(),
            datasources: HashMap::new(),
            points: HashMap::new(),
            max_ids: 10,
            datasource_calls: AtomicUsize::new(0),
            data_list_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_plant(mut self, id: PlantId, name: &str) -> Self {
        self.plants.push(Plant::new(id, name.to_string()));
        self
    }

    pub fn with_element(
        mut self,
        plant_id: PlantId,
        id: ElementId,
        name: &str,
        category: EquipmentCategory,
        datasources: Vec<DatasourceDescriptor>,
    ) -> Self {
        self.equipment.entry(plant_id).or_default().push(Equipment::new(
            id,
            name.to_string(),
            category.as_str().to_string(),
            category,
        ));
        self.datasources.insert(id, datasources);
        self
    }

    pub fn with_points(mut self, points: Vec<RawPoint>) -> Self {
        for point in points {
            self.points.entry(point.datasource_id).or_default().push(point);
        }
        self
    }

    pub fn datasource_calls(&self) -> usize {
        self.datasource_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<DataListRequest> {
        self.data_list_requests.lock().unwrap().clone()
    }
}

/// A plant with two containers, continuous inverter numbering, one meter and
/// two strings, plus one weather station on container 2.
pub fn sample_plant() -> InMemoryRepository {
    let power = |id| DatasourceDescriptor::new(id, "Active Power", "kW");
    let energy = |id| DatasourceDescriptor::new(id, "Active Energy", "kWh");

    InMemoryRepository::new()
        .with_plant(4, "Los Llanos")
        .with_element(4, 100, "Inverter 1.1", EquipmentCategory::Inverter, vec![
            DatasourceDescriptor::new(1000, "DC Voltage", "V"),
            power(1001),
        ])
        .with_element(4, 101, "Inverter 1.2", EquipmentCategory::Inverter, vec![power(1011)])
        .with_element(4, 102, "Inverter 2.3", EquipmentCategory::Inverter, vec![power(1021)])
        .with_element(4, 200, "Main Meter", EquipmentCategory::Meter, vec![
            power(2001),
            DatasourceDescriptor::new(2002, "Active Power Total (kW)", "kW"),
            energy(2003),
        ])
        .with_element(4, 300, "String CT1.1.1", EquipmentCategory::String, vec![energy(3001)])
        .with_element(4, 301, "String CT2.3.1", EquipmentCategory::String, vec![energy(3011)])
        .with_element(4, 400, "Weather Station CT2", EquipmentCategory::WeatherStation, vec![
            DatasourceDescriptor::new(4001, "GHI Irradiance", "W/m2"),
            DatasourceDescriptor::new(4002, "POA Irradiance", "W/m2"),
            DatasourceDescriptor::new(4003, "RPOA Irradiance", "W/m2"),
            DatasourceDescriptor::new(4004, "POA Internal Temp", "C"),
            DatasourceDescriptor::new(4005, "Wind Speed", "m/s"),
            DatasourceDescriptor::new(4006, "Soiling Clean Cell", "W/m2"),
            DatasourceDescriptor::new(4007, "Soiling Soiled Cell", "W/m2"),
        ])
}

#[async_trait]
impl MonitoringRepository for InMemoryRepository {
    async fn ping(&self) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_plants(&self) -> anyhow::Result<Vec<Plant>> {
        Ok(self.plants.clone())
    }

    async fn plant_detail(&self, plant_id: PlantId) -> anyhow::Result<serde_json::Value> {
        let plant = self
            .plants
            .iter()
            .find(|p| p.id == plant_id)
            .ok_or_else(|| anyhow::anyhow!("no plant {}", plant_id))?;
        Ok(serde_json::to_value(plant)?)
    }

    async fn element_detail(&self, plant_id: PlantId, element_id: ElementId) -> anyhow::Result<serde_json::Value> {
        let element = self
            .equipment
            .get(&plant_id)
            .and_then(|elements| elements.iter().find(|e| e.id == element_id))
            .ok_or_else(|| anyhow::anyhow!("no element {} in plant {}", element_id, plant_id))?;
        Ok(serde_json::to_value(element)?)
    }

    async fn list_equipment(&self, plant_id: PlantId) -> anyhow::Result<Vec<Equipment>> {
        Ok(self.equipment.get(&plant_id).cloned().unwrap_or_default())
    }

    async fn list_datasources(
        &self,
        _plant_id: PlantId,
        element_id: ElementId,
    ) -> anyhow::Result<Vec<DatasourceDescriptor>> {
        self.datasource_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.datasources.get(&element_id).cloned().unwrap_or_default())
    }

    async fn list_plant_datasources(&self, plant_id: PlantId) -> anyhow::Result<Vec<DatasourceDescriptor>> {
        let elements = self.equipment.get(&plant_id).map(Vec::as_slice).unwrap_or_default();
        Ok(elements
            .iter()
            .filter_map(|e| self.datasources.get(&e.id))
            .flatten()
            .cloned()
            .collect())
    }

    async fn fetch_data_list(&self, request: &DataListRequest) -> anyhow::Result<Vec<RawPoint>> {
        if request.datasource_ids.len() > self.max_ids {
            anyhow::bail!("too many datasource ids: {}", request.datasource_ids.len());
        }
        self.data_list_requests.lock().unwrap().push(request.clone());
        Ok(request
            .datasource_ids
            .iter()
            .flat_map(|id| self.points.get(id).cloned().unwrap_or_default())
            .collect())
    }

    fn max_ids_per_request(&self) -> usize {
        self.max_ids
    }
}

/// Map and dataset store keeping documents in memory.
#[derive(Default)]
pub struct InMemoryStore {
    pub maps: Mutex<HashMap<String, DatasourceMap>>,
    pub datasets: Mutex<HashMap<String, TimeSeriesTable>>,
}

impl InMemoryStore {
    pub fn map(&self, key: &str) -> Option<DatasourceMap> {
        self.maps.lock().unwrap().get(key).cloned()
    }

    pub fn dataset(&self, key: &str) -> Option<TimeSeriesTable> {
        self.datasets.lock().unwrap().get(key).cloned()
    }
}

impl MapStore for InMemoryStore {
    fn load_map(&self, plant: &Plant, table: Table) -> anyhow::Result<Option<DatasourceMap>> {
        Ok(self.map(&map_key(plant, table)))
    }

    fn save_map(&self, plant: &Plant, table: Table, map: &DatasourceMap) -> anyhow::Result<PathBuf> {
        let key = map_key(plant, table);
        self.maps.lock().unwrap().insert(key.clone(), map.clone());
        Ok(PathBuf::from(key))
    }
}

impl DatasetStore for InMemoryStore {
    fn save_dataset(
        &self,
        plant: &Plant,
        table: Table,
        window: &TimeWindow,
        rows: &TimeSeriesTable,
    ) -> anyhow::Result<PathBuf> {
        let key = dataset_key(plant, table, window);
        self.datasets.lock().unwrap().insert(key.clone(), rows.clone());
        Ok(PathBuf::from(key))
    }
}
