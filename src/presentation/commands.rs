// Command handlers: run one CLI command and print its result as JSON
use crate::application::imputer::impute;
use crate::application::monitoring_repository::DataListRequest;
use crate::application::patterns::PatternCatalog;
use crate::application::signal_extractor::extract;
use crate::domain::equipment::Equipment;
use crate::domain::error::PlantLookup;
use crate::domain::signal::{DatasourceDescriptor, SignalKind};
use crate::domain::time_series::{Aggregation, TimeSeriesTable, TimeWindow};
use crate::infrastructure::file_store::{read_json, write_json};
use crate::presentation::app_state::AppState;
use crate::presentation::cli::{Commands, DatalistArgs, ImputeArgs, PipelineArgs};
use serde::Serialize;
use std::collections::BTreeMap;

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Commands that work on local files only and need no platform connection.
pub fn run_offline(command: &Commands) -> Option<anyhow::Result<()>> {
    match command {
        Commands::Impute(args) => Some(run_impute(args)),
        _ => None,
    }
}

pub async fn run(state: &AppState, command: Commands) -> anyhow::Result<()> {
    state.repository.ping().await?;

    match command {
        Commands::Ping => Ok(()),
        Commands::Plants => {
            let plants = state.repository.list_plants().await?;
            tracing::info!("Plants retrieved successfully");
            print_json(&plants)
        }
        Commands::PlantDetail { plant_id } => print_json(&state.repository.plant_detail(plant_id).await?),
        Commands::Elements { plant_id } => {
            let equipment = state.repository.list_equipment(plant_id).await?;
            let mut grouped: BTreeMap<String, Vec<Equipment>> = BTreeMap::new();
            for element in equipment {
                grouped.entry(element.type_label.clone()).or_default().push(element);
            }
            tracing::info!("Retrieved elements successfully for plant ID {}", plant_id);
            print_json(&grouped)
        }
        Commands::ElementDetail { plant_id, element_id } => {
            print_json(&state.repository.element_detail(plant_id, element_id).await?)
        }
        Commands::Datasources {
            plant_id,
            element_id,
            signal,
        } => {
            let sources = state.repository.list_datasources(plant_id, element_id).await?;
            print_json(&of_signal(&state.catalog, &sources, signal))
        }
        Commands::PlantDatasources { plant_id, signal } => {
            let sources = state.repository.list_plant_datasources(plant_id).await?;
            tracing::info!("Retrieved {} datasources for plant ID {}", sources.len(), plant_id);
            print_json(&of_signal(&state.catalog, &sources, signal))
        }
        Commands::DatasourcesMap { plant_id, table } => {
            let plant = state
                .plant_data_service
                .find_plant(PlantLookup::Id(plant_id))
                .await?;
            let (map, path) = state.plant_data_service.rebuild_map(&plant, table).await?;
            tracing::info!("Datasources map for table {} saved in {}", table, path.display());
            print_json(&map)
        }
        Commands::Datalist(args) => run_datalist(state, args).await,
        Commands::Pipeline(args) => run_pipeline(state, args).await,
        Commands::Impute(args) => run_impute(&args),
    }
}

/// All sources, or only those carrying `signal` when one is given.
fn of_signal<'a>(
    catalog: &PatternCatalog,
    sources: &'a [DatasourceDescriptor],
    signal: Option<SignalKind>,
) -> Vec<&'a DatasourceDescriptor> {
    match signal.and_then(|kind| catalog.signal_pattern(kind)) {
        Some(pattern) => extract(sources, pattern),
        None => sources.iter().collect(),
    }
}

async fn run_datalist(state: &AppState, args: DatalistArgs) -> anyhow::Result<()> {
    let aggregation = Aggregation::from_code(args.aggregation)
        .ok_or_else(|| anyhow::anyhow!("unknown aggregation type {}", args.aggregation))?;
    let request = DataListRequest {
        datasource_ids: args.ids.0,
        window: TimeWindow::parse(&args.start, &args.end)?,
        grouping: args.grouping,
        granularity: args.granularity,
        aggregation,
    };
    let points = state.repository.fetch_data_list(&request).await?;
    let rows: Vec<_> = points
        .iter()
        .map(|p| serde_json::json!({"Date": p.timestamp, "DataSourceId": p.datasource_id, "Value": p.value}))
        .collect();
    print_json(&rows)
}

async fn run_pipeline(state: &AppState, args: PipelineArgs) -> anyhow::Result<()> {
    let lookup = match (args.plant_id, args.plant_name) {
        (Some(id), _) => PlantLookup::Id(id),
        (None, Some(name)) => PlantLookup::SafeName(name),
        (None, None) => anyhow::bail!("either --plant-id or --plant-name is required"),
    };
    let window = TimeWindow::parse(&args.start, &args.end)?;

    let service = &state.plant_data_service;
    let plant = service.find_plant(lookup).await?;
    let output = service.run(&plant, &window).await?;

    print_json(&serde_json::json!({
        "gen": output.gen_path,
        "weather": output.weather_path,
    }))
}

fn run_impute(args: &ImputeArgs) -> anyhow::Result<()> {
    let table: TimeSeriesTable = read_json(&args.input)?;
    let (table, incidents) = impute(table, &args.fields);

    write_json(&args.output, &table)?;
    let stem = args
        .output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("imputed");
    let incidents_path = args.output.with_file_name(format!("{}_incidents.json", stem));
    write_json(&incidents_path, &incidents)?;

    tracing::info!("Imputed {} rows, {} incidents", table.len(), incidents.len());
    Ok(())
}
