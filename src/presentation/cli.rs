// Command line definitions - clap derive surface
use crate::domain::equipment::ElementId;
use crate::domain::plant::PlantId;
use crate::domain::signal::{DatasourceId, SignalKind, Table};
use crate::infrastructure::config::DEFAULT_CONFIG_STEM;
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-telemetry")]
#[command(author, version, about = "Discovers and collects solar plant telemetry from the GPM platform")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Config file stem, without extension
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_STEM)]
    pub config: String,

    /// Report per-equipment progress of discovery at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the platform is reachable and the credentials valid
    Ping,

    /// List all plants
    Plants,

    /// Show the platform record of one plant
    PlantDetail { plant_id: PlantId },

    /// List the elements of a plant grouped by type
    Elements { plant_id: PlantId },

    /// Show the platform record of one element
    ElementDetail { plant_id: PlantId, element_id: ElementId },

    /// List the datasources of an element, optionally only those of one signal
    Datasources {
        plant_id: PlantId,
        element_id: ElementId,
        /// active_power or active_energy
        #[arg(long)]
        signal: Option<SignalKind>,
    },

    /// List the datasources of every element of a plant, optionally only those of one signal
    PlantDatasources {
        plant_id: PlantId,
        /// active_power or active_energy
        #[arg(long)]
        signal: Option<SignalKind>,
    },

    /// Rebuild and save the datasources map of a plant for the gen or weather table
    DatasourcesMap { plant_id: PlantId, table: Table },

    /// Fetch raw data for a set of datasource ids
    Datalist(DatalistArgs),

    /// Run the full pipeline for one plant and save the gen and weather datasets
    Pipeline(PipelineArgs),

    /// Fill missing fields of a saved dataset with zeros
    Impute(ImputeArgs),
}

#[derive(Args)]
pub struct DatalistArgs {
    /// Comma-separated datasource ids
    #[arg(value_parser = parse_ids)]
    pub ids: DatasourceIds,

    /// Start date, YYYY-MM-DDTHH:MM:SS
    pub start: String,

    /// End date, YYYY-MM-DDTHH:MM:SS
    pub end: String,

    /// raw, minute, hour, day
    #[arg(long, default_value = "minute")]
    pub grouping: String,

    #[arg(long, default_value_t = 15)]
    pub granularity: u32,

    /// 0 = sum without zeros, 1 = average
    #[arg(long, default_value_t = 1)]
    pub aggregation: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasourceIds(pub Vec<DatasourceId>);

fn parse_ids(raw: &str) -> Result<DatasourceIds, String> {
    raw.split(',')
        .map(|id| id.trim().parse::<DatasourceId>().map_err(|e| format!("invalid datasource id '{}': {}", id, e)))
        .collect::<Result<Vec<_>, _>>()
        .map(DatasourceIds)
}

#[derive(Args)]
#[command(group(ArgGroup::new("plant").required(true).args(["plant_id", "plant_name"])))]
pub struct PipelineArgs {
    #[arg(long)]
    pub plant_id: Option<PlantId>,

    /// Plant safe name, case-insensitive
    #[arg(long)]
    pub plant_name: Option<String>,

    pub start: String,

    pub end: String,
}

#[derive(Args)]
pub struct ImputeArgs {
    pub input: PathBuf,

    pub output: PathBuf,

    /// Comma-separated field names every row must carry
    #[arg(long, value_delimiter = ',', required = true)]
    pub fields: Vec<String>,
}
