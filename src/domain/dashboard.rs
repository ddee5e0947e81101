// Dashboard domain model
use super::station::Station;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub caption: String,
    pub tabs: Vec<StationTab>,
    /// Shown as a banner when the data load degraded
    pub warning: Option<String>,
    pub last_modified: LastModified,
    pub show_value_markers: bool,
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LastModified {
    At(chrono::DateTime<chrono::Utc>),
    Unavailable,
}

impl LastModified {
    pub fn caption(&self) -> String {
        match self {
            LastModified::At(time) => format!("Last updated: {} UTC", time.format("%Y-%m-%d %H:%M:%S")),
            LastModified::Unavailable => "Last modified time unavailable".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StationTab {
    pub station: Station,
    pub panels: Vec<Panel>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub range_name: String,
    pub title: String,
    pub content: PanelContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "chart", rename_all = "snake_case")]
pub enum PanelContent {
    Chart(ChartData),
    NoData,
}

/// Line chart over a categorical x axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Distinct timestamp labels in first-appearance order
    pub x_labels: Vec<String>,
    pub series: Vec<SeriesData>,
    /// Draw point markers and value annotations
    pub show_markers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesData {
    pub category: String,
    pub color: String,
    /// (index into `x_labels`, value)
    pub points: Vec<(usize, f64)>,
}

impl ChartData {
    /// Min and max over every plotted value
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.points.iter().map(|(_, v)| *v))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
