// Application state shared by CLI commands
use crate::application::map_builder::{DatasourceMapBuilder, Verbosity};
use crate::application::monitoring_repository::MonitoringRepository;
use crate::application::patterns::PatternCatalog;
use crate::application::plant_data_service::PlantDataService;
use crate::infrastructure::config::GpmConfig;
use crate::infrastructure::file_store::JsonFileStore;
use crate::infrastructure::gpm_client::GpmClient;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn MonitoringRepository>,
    pub catalog: Arc<PatternCatalog>,
    pub plant_data_service: PlantDataService,
}

impl AppState {
    pub fn from_config(config: &GpmConfig, verbosity: Verbosity) -> anyhow::Result<Self> {
        let catalog = Arc::new(PatternCatalog::builtin()?);

        let repository: Arc<dyn MonitoringRepository> = Arc::new(GpmClient::new(
            config.api.base_url.clone(),
            config.api.username.clone(),
            config.api.password.clone(),
            Duration::from_secs(config.api.timeout_secs),
            catalog.clone(),
            config.datalist.batch_size,
        )?);

        let store = Arc::new(JsonFileStore::new(
            config.storage.maps_dir.clone(),
            config.storage.data_dir.clone(),
        ));

        let builder = DatasourceMapBuilder::new(repository.clone(), catalog.clone()).with_verbosity(verbosity);
        let plant_data_service = PlantDataService::new(
            repository.clone(),
            builder,
            store.clone(),
            store,
            config.datalist.settings(),
        );

        Ok(Self {
            repository,
            catalog,
            plant_data_service,
        })
    }
}
