// Configuration - Optional TOML file overlaid with GPM_ environment variables
use crate::application::plant_data_service::DataListSettings;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_STEM: &str = "config/gpm";

#[derive(Debug, Deserialize, Clone)]
pub struct GpmConfig {
    pub api: ApiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub datalist: DatalistConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_maps_dir")]
    pub maps_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            maps_dir: default_maps_dir(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatalistConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_grouping")]
    pub grouping: String,
    #[serde(default = "default_granularity")]
    pub granularity: u32,
}

impl Default for DatalistConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            grouping: default_grouping(),
            granularity: default_granularity(),
        }
    }
}

impl DatalistConfig {
    pub fn settings(&self) -> DataListSettings {
        DataListSettings {
            batch_size: self.batch_size,
            grouping: self.grouping.clone(),
            granularity: self.granularity,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_maps_dir() -> PathBuf {
    PathBuf::from("datasources_maps")
}

fn default_batch_size() -> usize {
    10
}

fn default_grouping() -> String {
    "minute".to_string()
}

fn default_granularity() -> u32 {
    15
}

/// Load `<stem>.toml` (optional) overlaid with `GPM_` environment variables,
/// e.g. `GPM_API__PASSWORD`.
pub fn load_gpm_config(stem: &str) -> anyhow::Result<GpmConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(stem).required(false))
        .add_source(
            config::Environment::with_prefix("GPM")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    from_settings(settings)
}

fn from_settings(settings: config::Config) -> anyhow::Result<GpmConfig> {
    let config: GpmConfig = settings.try_deserialize()?;
    if config.datalist.batch_size == 0 {
        anyhow::bail!("datalist.batch_size must be at least 1");
    }
    Ok(config)
}
