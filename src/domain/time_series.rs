// Time-series domain models
use super::error::DiscoveryError;
use super::signal::DatasourceId;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const WINDOW_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One (timestamp, datasource, value) triple as returned by the data-list endpoint.
/// A `None` value is a null reported by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub timestamp: String,
    pub datasource_id: DatasourceId,
    pub value: Option<f64>,
}

impl RawPoint {
    pub fn new(timestamp: impl Into<String>, datasource_id: DatasourceId, value: f64) -> Self {
        Self::with_reading(timestamp, datasource_id, Some(value))
    }

    pub fn with_reading(timestamp: impl Into<String>, datasource_id: DatasourceId, value: Option<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            datasource_id,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub timestamp: String,
    /// Present columns; a null reading stays as `None` and serializes as `null`.
    #[serde(flatten)]
    pub values: BTreeMap<String, Option<f64>>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), Some(value));
        self
    }

    pub fn with_null(mut self, name: impl Into<String>) -> Self {
        self.values.insert(name.into(), None);
        self
    }
}

/// Rows with unique timestamps, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeriesTable {
    pub rows: Vec<TimeSeriesPoint>,
}

impl TimeSeriesTable {
    pub fn new(rows: Vec<TimeSeriesPoint>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Sum ignoring zeros; used for energy counters.
    Sum,
    Average,
}

impl Aggregation {
    pub fn code(&self) -> u8 {
        match self {
            Aggregation::Sum => 0,
            Aggregation::Average => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Aggregation::Sum),
            1 => Some(Aggregation::Average),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    /// Parse a `YYYY-MM-DDTHH:MM:SS` pair.
    pub fn parse(start: &str, end: &str) -> Result<Self, DiscoveryError> {
        let parse = |value: &str| {
            NaiveDateTime::parse_from_str(value, WINDOW_FORMAT)
                .map_err(|e| DiscoveryError::InvalidWindow(format!("'{}': {}", value, e)))
        };
        let start = parse(start)?;
        let end = parse(end)?;
        if start >= end {
            return Err(DiscoveryError::InvalidWindow(format!(
                "start {} is not before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start_param(&self) -> String {
        self.start.format(WINDOW_FORMAT).to_string()
    }

    pub fn end_param(&self) -> String {
        self.end.format(WINDOW_FORMAT).to_string()
    }

    /// Date range as used in dataset file names, colons stripped.
    pub fn file_tag(&self) -> String {
        format!(
            "{}_{}",
            self.start_param().replace(':', ""),
            self.end_param().replace(':', "")
        )
    }
}
