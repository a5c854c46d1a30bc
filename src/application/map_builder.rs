// Datasource map builder - Discovery pass from equipment to canonical signal names
use crate::application::classifier::RuleSet;
use crate::application::hierarchy_resolver::{infer_topology, HierarchyResolver, NameFormat};
use crate::application::monitoring_repository::MonitoringRepository;
use crate::application::patterns::PatternCatalog;
use crate::application::signal_extractor::extract_first;
use crate::domain::equipment::{of_category, Equipment, EquipmentCategory};
use crate::domain::error::DiscoveryError;
use crate::domain::plant::PlantId;
use crate::domain::signal::{DatasourceDescriptor, DatasourceMap, SignalKind, SignalMapEntry, Table};
use std::collections::HashSet;
use std::sync::Arc;

/// Canonical names of the plant-level meter signals.
pub const METER_POWER_NAME: &str = "act_power";
pub const METER_ENERGY_NAME: &str = "act_energy";

/// How loudly per-equipment progress is reported. Warnings are unaffected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    #[default]
    Quiet,
    Verbose,
}

/// Requests one datasource listing per equipment; callers persist the result
/// through a `MapStore` and reuse it.
#[derive(Clone)]
pub struct DatasourceMapBuilder {
    repository: Arc<dyn MonitoringRepository>,
    catalog: Arc<PatternCatalog>,
    verbosity: Verbosity,
}

impl DatasourceMapBuilder {
    pub fn new(repository: Arc<dyn MonitoringRepository>, catalog: Arc<PatternCatalog>) -> Self {
        Self {
            repository,
            catalog,
            verbosity: Verbosity::default(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub async fn build(&self, plant_id: PlantId, table: Table) -> Result<DatasourceMap, DiscoveryError> {
        let equipment = self.repository.list_equipment(plant_id).await?;
        tracing::info!("Retrieving {} table datasources for plant ID {}", table, plant_id);

        let map = match table {
            Table::Gen => self.build_gen(plant_id, &equipment).await?,
            Table::Weather => self.build_weather(plant_id, &equipment).await?,
        };

        tracing::info!(
            "{} datasources map built for plant ID {} ({} entries)",
            table,
            plant_id,
            map.len()
        );
        Ok(map)
    }

    async fn build_gen(&self, plant_id: PlantId, equipment: &[Equipment]) -> Result<DatasourceMap, DiscoveryError> {
        let inverters = required(equipment, EquipmentCategory::Inverter)?;
        let meters = required(equipment, EquipmentCategory::Meter)?;
        let strings = required(equipment, EquipmentCategory::String)?;

        let inverter_names: Vec<&str> = inverters.iter().map(|e| e.name.as_str()).collect();
        let inference = infer_topology(&inverter_names, &self.catalog.inverter_hierarchy);
        tracing::debug!(
            "Inverters per CT: {:?}, resets per CT: {}",
            inference.topology.counts_per_container,
            inference.topology.resets_per_container
        );
        let resolver = HierarchyResolver::new(inference.topology);

        // Canonicalize everything before any round trip so a topology
        // violation aborts the pass without touching the platform.
        let inverters = canonicalized(&resolver, inverters, &self.catalog.inverter_hierarchy, NameFormat::Inverter)?;
        let strings = canonicalized(&resolver, strings, &self.catalog.string_hierarchy, NameFormat::String)?;

        let mut map = DatasourceMap::new();

        for (canonical, inverter) in inverters {
            let sources = self.datasources_of(plant_id, inverter).await?;
            if let Some(entry) = self.signal_entry(&canonical, inverter, &sources, SignalKind::ActivePower) {
                map.insert(entry);
            }
        }

        for meter in meters {
            let sources = self.datasources_of(plant_id, meter).await?;
            for (canonical, kind) in [
                (METER_POWER_NAME, SignalKind::ActivePower),
                (METER_ENERGY_NAME, SignalKind::ActiveEnergy),
            ] {
                if let Some(entry) = self.signal_entry(canonical, meter, &sources, kind) {
                    map.insert(entry);
                }
            }
        }

        for (canonical, string) in strings {
            let sources = self.datasources_of(plant_id, string).await?;
            if let Some(entry) = self.signal_entry(&canonical, string, &sources, SignalKind::ActiveEnergy) {
                map.insert(entry);
            }
        }

        Ok(map)
    }

    async fn build_weather(&self, plant_id: PlantId, equipment: &[Equipment]) -> Result<DatasourceMap, DiscoveryError> {
        let stations: Vec<(u32, &Equipment)> = equipment
            .iter()
            .filter_map(|e| {
                let hit = self.catalog.weather_stations.classify(&e.name)?;
                Some((hit.indices.first().copied().unwrap_or(1), e))
            })
            .collect();

        if stations.is_empty() {
            tracing::error!("No weather station found for plant ID {}", plant_id);
            return Err(DiscoveryError::MissingCategory(EquipmentCategory::WeatherStation));
        }

        let mut map = DatasourceMap::new();
        for (container, station) in stations {
            let sources = self.datasources_of(plant_id, station).await?;
            let mut taken: HashSet<SignalKind> = HashSet::new();
            for source in &sources {
                let Some(kind) = self.catalog.weather_kinds.classify(&source.name).map(|c| c.outcome) else {
                    continue;
                };
                let Some(suffix) = kind.weather_suffix() else {
                    continue;
                };
                // First match in response order wins per station
                if !taken.insert(kind) {
                    tracing::warn!(
                        "{} {} ({}): discarding additional match '{}' ({})",
                        station.category,
                        station.name,
                        kind,
                        source.name,
                        source.id
                    );
                    continue;
                }
                map.insert(SignalMapEntry::new(
                    format!("ct{:02}_{}", container, suffix),
                    station.id,
                    source,
                ));
            }
        }

        Ok(map)
    }

    async fn datasources_of(
        &self,
        plant_id: PlantId,
        equipment: &Equipment,
    ) -> Result<Vec<DatasourceDescriptor>, DiscoveryError> {
        match self.verbosity {
            Verbosity::Verbose => tracing::info!("Retrieving datasources for {} {}", equipment.category, equipment.name),
            Verbosity::Quiet => tracing::debug!("Retrieving datasources for {} {}", equipment.category, equipment.name),
        }
        Ok(self.repository.list_datasources(plant_id, equipment.id).await?)
    }

    fn signal_entry(
        &self,
        canonical: &str,
        equipment: &Equipment,
        sources: &[DatasourceDescriptor],
        kind: SignalKind,
    ) -> Option<SignalMapEntry> {
        let pattern = self.catalog.signal_pattern(kind)?;
        let context = format!("{} {} ({})", equipment.category, equipment.name, kind);
        match extract_first(sources, pattern, &context) {
            Some(source) => Some(SignalMapEntry::new(canonical, equipment.id, source)),
            None => {
                tracing::warn!("No {} datasource found for {} {}", kind, equipment.category, equipment.name);
                None
            }
        }
    }
}

fn required(equipment: &[Equipment], category: EquipmentCategory) -> Result<Vec<&Equipment>, DiscoveryError> {
    let members = of_category(equipment, category);
    if members.is_empty() {
        tracing::error!("No {} found", category);
        return Err(DiscoveryError::MissingCategory(category));
    }
    Ok(members)
}

fn canonicalized<'a>(
    resolver: &HierarchyResolver,
    equipment: Vec<&'a Equipment>,
    patterns: &RuleSet<()>,
    format: NameFormat,
) -> Result<Vec<(String, &'a Equipment)>, DiscoveryError> {
    equipment
        .into_iter()
        .map(|e| resolver.canonicalize(&e.name, patterns, format).map(|name| (name, e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{sample_plant, InMemoryRepository};

    fn builder(repository: Arc<InMemoryRepository>) -> DatasourceMapBuilder {
        DatasourceMapBuilder::new(repository, Arc::new(PatternCatalog::builtin().unwrap()))
    }

    fn names(map: &DatasourceMap) -> Vec<&str> {
        map.entries().iter().map(|e| e.canonical_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_gen_map_orders_inverters_meters_strings() {
        let repository = Arc::new(sample_plant());
        let map = builder(repository.clone()).build(4, Table::Gen).await.unwrap();

        assert_eq!(
            names(&map),
            vec![
                "ct01_inv01",
                "ct01_inv02",
                "ct02_inv01",
                "act_power",
                "act_energy",
                "ct01_01_str01",
                "ct02_01_str01",
            ]
        );
        // Voltage channel skipped, power channel picked
        assert_eq!(map.entries()[0].datasource_id, 1001);
        // Two power channels on the meter: first one in response order wins
        assert_eq!(map.entries()[3].datasource_id, 2001);
        assert_eq!(map.entries()[4].datasource_id, 2003);
        assert_eq!(map.entries()[4].datasource_unit, "kWh");
    }

    #[tokio::test]
    async fn test_gen_map_missing_meter() {
        let repository = InMemoryRepository::new()
            .with_element(1, 10, "CT1.1", EquipmentCategory::Inverter, vec![])
            .with_element(1, 11, "String CT1.1.1", EquipmentCategory::String, vec![]);

        let err = builder(Arc::new(repository)).build(1, Table::Gen).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingCategory(EquipmentCategory::Meter)));
    }

    #[tokio::test]
    async fn test_gen_map_missing_inverter_reported_first() {
        let repository = InMemoryRepository::new()
            .with_element(1, 20, "Meter", EquipmentCategory::Meter, vec![]);

        let err = builder(Arc::new(repository)).build(1, Table::Gen).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingCategory(EquipmentCategory::Inverter)));
    }

    #[tokio::test]
    async fn test_topology_violation_aborts_before_fetching() {
        let repository = Arc::new(
            InMemoryRepository::new()
                .with_element(1, 10, "CT1.1", EquipmentCategory::Inverter, vec![])
                .with_element(1, 20, "Meter", EquipmentCategory::Meter, vec![])
                .with_element(1, 30, "String CT3.1.1", EquipmentCategory::String, vec![]),
        );

        let err = builder(repository.clone()).build(1, Table::Gen).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::TopologyViolation { .. }));
        assert_eq!(repository.datasource_calls(), 0);
    }

    #[tokio::test]
    async fn test_multiple_meters_share_literal_names() {
        let power = |id| DatasourceDescriptor::new(id, "Active Power", "kW");
        let repository = InMemoryRepository::new()
            .with_element(1, 10, "CT1.1", EquipmentCategory::Inverter, vec![power(1)])
            .with_element(1, 20, "Meter A", EquipmentCategory::Meter, vec![power(2)])
            .with_element(1, 21, "Meter B", EquipmentCategory::Meter, vec![power(3)])
            .with_element(1, 30, "String CT1.1.1", EquipmentCategory::String, vec![]);

        let map = builder(Arc::new(repository)).build(1, Table::Gen).await.unwrap();
        assert_eq!(names(&map), vec!["ct01_inv01", "act_power"]);
        assert_eq!(map.entries()[1].element_id, 21);
    }

    #[tokio::test]
    async fn test_weather_map() {
        let repository = Arc::new(sample_plant());
        let map = builder(repository)
            .with_verbosity(Verbosity::Verbose)
            .build(4, Table::Weather)
            .await
            .unwrap();

        assert_eq!(
            names(&map),
            vec![
                "ct02_pyr1_h",
                "ct02_albedo1_up",
                "ct02_albedo1_down",
                "ct02_temp_p1",
                "ct02_clean_cell1",
                "ct02_dirty_cell1",
            ]
        );
        assert!(map.entries().iter().all(|e| e.element_id == 400));
    }

    #[tokio::test]
    async fn test_weather_map_keeps_first_match_per_station() {
        let repository = InMemoryRepository::new().with_element(
            1,
            40,
            "Weather Station CT1",
            EquipmentCategory::WeatherStation,
            vec![
                DatasourceDescriptor::new(11, "GHI Irradiance 1", "W/m2"),
                DatasourceDescriptor::new(12, "GHI Irradiance 2", "W/m2"),
                DatasourceDescriptor::new(13, "POA Irradiance", "W/m2"),
            ],
        );

        let map = builder(Arc::new(repository)).build(1, Table::Weather).await.unwrap();
        assert_eq!(names(&map), vec!["ct01_pyr1_h", "ct01_albedo1_up"]);
        assert_eq!(map.entries()[0].datasource_id, 11);
        assert_eq!(map.entries()[0].datasource_name, "GHI Irradiance 1");
    }

    #[tokio::test]
    async fn test_weather_stations_on_different_containers_keep_their_own_kinds() {
        let ghi = |id| vec![DatasourceDescriptor::new(id, "GHI Irradiance", "W/m2")];
        let repository = InMemoryRepository::new()
            .with_element(1, 40, "Weather Station CT1", EquipmentCategory::WeatherStation, ghi(11))
            .with_element(1, 41, "Weather Station CT2", EquipmentCategory::WeatherStation, ghi(21));

        let map = builder(Arc::new(repository)).build(1, Table::Weather).await.unwrap();
        assert_eq!(names(&map), vec!["ct01_pyr1_h", "ct02_pyr1_h"]);
        assert_eq!(map.entries()[1].datasource_id, 21);
    }

    #[tokio::test]
    async fn test_weather_station_without_container_defaults_to_one() {
        let repository = InMemoryRepository::new().with_element(
            1,
            50,
            "WS roof",
            EquipmentCategory::Other,
            vec![DatasourceDescriptor::new(5, "GHI Irradiance", "W/m2")],
        );

        let map = builder(Arc::new(repository)).build(1, Table::Weather).await.unwrap();
        assert_eq!(names(&map), vec!["ct01_pyr1_h"]);
    }

    #[tokio::test]
    async fn test_weather_map_missing_station() {
        let repository = InMemoryRepository::new()
            .with_element(1, 10, "CT1.1", EquipmentCategory::Inverter, vec![]);

        let err = builder(Arc::new(repository)).build(1, Table::Weather).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::MissingCategory(EquipmentCategory::WeatherStation)));
    }
}
