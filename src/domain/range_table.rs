// Range table domain models - typed rows parsed from a worksheet
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Header names that supply each field of a row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ColumnNames {
    #[serde(default = "default_timestamp_column")]
    pub timestamp: String,
    #[serde(default = "default_category_column")]
    pub category: String,
    #[serde(default = "default_value_column")]
    pub value: String,
}

fn default_timestamp_column() -> String {
    "Serialization".to_string()
}

fn default_category_column() -> String {
    "Category".to_string()
}

fn default_value_column() -> String {
    "Value".to_string()
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            timestamp: default_timestamp_column(),
            category: default_category_column(),
            value: default_value_column(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeRow {
    pub timestamp: String,
    pub category: String,
    pub value: f64,
}

impl RangeRow {
    pub fn new(timestamp: impl Into<String>, category: impl Into<String>, value: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            category: category.into(),
            value,
        }
    }
}

/// Rows of one worksheet. Every row has a non-empty timestamp and a finite value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RangeTable {
    pub rows: Vec<RangeRow>,
}

/// What happened while parsing one range
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub kept: usize,
    pub dropped: usize,
    /// Required header names that were not found
    pub missing_columns: Vec<String>,
}

impl RangeTable {
    pub fn new(rows: Vec<RangeRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Build a table from raw worksheet rows. The first row is the header.
    ///
    /// Rows whose value does not parse as a finite number, or whose timestamp
    /// is blank, are dropped. Short rows read their missing cells as empty.
    /// A missing category cell becomes the empty string.
    pub fn from_rows(rows: &[Vec<String>], columns: &ColumnNames) -> (Self, ParseReport) {
        let mut report = ParseReport::default();

        let Some((header, body)) = rows.split_first() else {
            return (Self::default(), report);
        };

        let find = |name: &str| header.iter().position(|h| h.trim() == name);
        let timestamp_idx = find(&columns.timestamp);
        let value_idx = find(&columns.value);
        let category_idx = find(&columns.category);

        if timestamp_idx.is_none() {
            report.missing_columns.push(columns.timestamp.clone());
        }
        if value_idx.is_none() {
            report.missing_columns.push(columns.value.clone());
        }

        let (Some(timestamp_idx), Some(value_idx)) = (timestamp_idx, value_idx) else {
            report.dropped = body.len();
            return (Self::default(), report);
        };

        let mut parsed = Vec::with_capacity(body.len());
        for row in body {
            let timestamp = cell(row, timestamp_idx);
            let value = parse_value(cell(row, value_idx));

            match value {
                Some(value) if !timestamp.is_empty() => {
                    let category = category_idx.map(|idx| cell(row, idx)).unwrap_or("");
                    parsed.push(RangeRow::new(timestamp, category, value));
                }
                _ => report.dropped += 1,
            }
        }

        report.kept = parsed.len();
        (Self::new(parsed), report)
    }
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|c| c.trim()).unwrap_or("")
}

/// Numeric coercion for a single cell. Blank, non-numeric and non-finite cells yield `None`.
pub fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Output of one loader cycle: every requested range mapped to its table
#[derive(Debug, Clone, Serialize)]
pub struct LoadedRanges {
    pub tables: BTreeMap<String, RangeTable>,
    /// User-visible message when the fetch degraded to empty tables
    pub warning: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl LoadedRanges {
    pub fn new(tables: BTreeMap<String, RangeTable>) -> Self {
        Self {
            tables,
            warning: None,
            fetched_at: Utc::now(),
        }
    }

    /// An empty table for every requested range, plus a warning
    pub fn degraded(range_names: &[String], warning: impl Into<String>) -> Self {
        let tables = range_names
            .iter()
            .map(|name| (name.clone(), RangeTable::default()))
            .collect();

        Self {
            tables,
            warning: Some(warning.into()),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }

    pub fn table(&self, range_name: &str) -> Option<&RangeTable> {
        self.tables.get(range_name)
    }
}
