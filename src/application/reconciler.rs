// Relabels raw data-list triples and merges batched responses by timestamp
use crate::domain::signal::{DatasourceId, DatasourceMap};
use crate::domain::time_series::{RawPoint, TimeSeriesPoint, TimeSeriesTable};
use std::collections::BTreeMap;

/// Column name for a datasource missing from the map.
pub fn unknown_name(datasource_id: DatasourceId) -> String {
    format!("Unknown_{}", datasource_id)
}

/// Group raw triples by timestamp under their canonical names.
pub fn relabel(points: &[RawPoint], map: &DatasourceMap) -> TimeSeriesTable {
    let names = map.name_by_datasource();
    let mut grouped: BTreeMap<String, TimeSeriesPoint> = BTreeMap::new();

    for point in points {
        let name = match names.get(&point.datasource_id) {
            Some(name) => (*name).to_string(),
            None => {
                tracing::warn!("Datasource {} is not in the map, kept as {}", point.datasource_id, unknown_name(point.datasource_id));
                unknown_name(point.datasource_id)
            }
        };
        grouped
            .entry(point.timestamp.clone())
            .or_insert_with(|| TimeSeriesPoint::new(point.timestamp.clone()))
            .values
            .insert(name, point.value);
    }

    TimeSeriesTable::new(grouped.into_values().collect())
}

/// Merge tables row by row on timestamp; later tables win on key collisions.
pub fn join<I>(tables: I) -> TimeSeriesTable
where
    I: IntoIterator<Item = TimeSeriesTable>,
{
    let mut joined: BTreeMap<String, TimeSeriesPoint> = BTreeMap::new();

    for table in tables {
        for row in table.rows {
            match joined.get_mut(&row.timestamp) {
                Some(existing) => existing.values.extend(row.values),
                None => {
                    joined.insert(row.timestamp.clone(), row);
                }
            }
        }
    }

    TimeSeriesTable::new(joined.into_values().collect())
}
