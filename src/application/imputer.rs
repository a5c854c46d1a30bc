// Imputer - zero-fills absent columns of a reconciled table and reports each patched row
use crate::domain::time_series::TimeSeriesTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub timestamp: String,
    pub missing_fields: Vec<String>,
}

/// Only absent columns count as missing; a column present with a null reading is left alone.
pub fn impute(mut table: TimeSeriesTable, fields: &[String]) -> (TimeSeriesTable, Vec<Incident>) {
    let mut incidents = Vec::new();

    for row in &mut table.rows {
        let missing: Vec<String> = fields
            .iter()
            .filter(|field| !row.values.contains_key(field.as_str()))
            .cloned()
            .collect();
        if missing.is_empty() {
            continue;
        }
        for field in &missing {
            row.values.insert(field.clone(), Some(0.0));
        }
        incidents.push(Incident {
            timestamp: row.timestamp.clone(),
            missing_fields: missing,
        });
    }

    if !incidents.is_empty() {
        tracing::warn!("Imputed missing values in {} rows", incidents.len());
    }
    (table, incidents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time_series::TimeSeriesPoint;

    #[test]
    fn test_impute_fills_zeros_and_reports() {
        let table = TimeSeriesTable::new(vec![
            TimeSeriesPoint::new("t0").with_value("a", 1.0).with_value("b", 2.0),
            TimeSeriesPoint::new("t1").with_value("a", 3.0),
        ]);
        let fields = vec!["a".to_string(), "b".to_string()];

        let (table, incidents) = impute(table, &fields);

        assert_eq!(table.rows[1].values.get("b"), Some(&Some(0.0)));
        assert_eq!(
            incidents,
            vec![Incident {
                timestamp: "t1".to_string(),
                missing_fields: vec!["b".to_string()],
            }]
        );
    }

    #[test]
    fn test_impute_complete_table_untouched() {
        let table = TimeSeriesTable::new(vec![TimeSeriesPoint::new("t0").with_value("a", 1.0)]);
        let (out, incidents) = impute(table.clone(), &["a".to_string()]);
        assert_eq!(out, table);
        assert!(incidents.is_empty());
    }

    #[test]
    fn test_impute_leaves_null_readings() {
        let table = TimeSeriesTable::new(vec![
            TimeSeriesPoint::new("t0").with_value("a", 1.0).with_null("b"),
            TimeSeriesPoint::new("t1").with_null("a"),
        ]);
        let fields = vec!["a".to_string(), "b".to_string()];

        let (table, incidents) = impute(table, &fields);

        assert_eq!(table.rows[0].values.get("b"), Some(&None));
        assert_eq!(table.rows[1].values.get("a"), Some(&None));
        assert_eq!(table.rows[1].values.get("b"), Some(&Some(0.0)));
        assert_eq!(
            incidents,
            vec![Incident {
                timestamp: "t1".to_string(),
                missing_fields: vec!["b".to_string()],
            }]
        );
    }
}
