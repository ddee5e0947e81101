// Station and granularity domain models
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A conveyor induct station, e.g. "Induct 105"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Station {
    pub id: String,
}

impl Station {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// HTML-safe identifier used for tab anchors. Empty when the id has no
    /// ASCII alphanumerics; distinct ids may share a slug.
    pub fn slug(&self) -> String {
        // Convert "Induct 105" to "induct-105"
        self.id
            .trim()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Aggregation period of a reading. `code` is the worksheet suffix,
/// `label` is what the chart title shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Granularity {
    pub code: String,
    pub label: String,
}

impl Granularity {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }

    pub fn defaults() -> Vec<Granularity> {
        vec![
            Granularity::new("Min", "Minute"),
            Granularity::new("Hour", "Hourly"),
            Granularity::new("Day", "Daily"),
        ]
    }
}

/// Template composing a range name from a station and a granularity code.
/// Supports the `${station}` and `${granularity}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeNameTemplate(String);

pub const DEFAULT_RANGE_NAME_TEMPLATE: &str = "${station} ${granularity}";

impl RangeNameTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn compose(&self, station: &Station, granularity: &Granularity) -> String {
        let mut vars = HashMap::new();
        vars.insert("station".to_string(), station.id.clone());
        vars.insert("granularity".to_string(), granularity.code.clone());
        expand_template(&self.0, &vars)
    }

    /// Every range name for the given stations, station-major
    pub fn compose_all(&self, stations: &[Station], granularities: &[Granularity]) -> Vec<String> {
        stations
            .iter()
            .flat_map(|s| granularities.iter().map(move |g| self.compose(s, g)))
            .collect()
    }
}

impl Default for RangeNameTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_RANGE_NAME_TEMPLATE)
    }
}

/// Replace template variables in a string
pub fn expand_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug() {
        assert_eq!(Station::new("Induct 105").slug(), "induct-105");
        assert_eq!(Station::new("  Induct  A/B ").slug(), "induct-a-b");
    }

    #[test]
    fn test_compose_range_name() {
        let template = RangeNameTemplate::default();
        let name = template.compose(&Station::new("Induct 101"), &Granularity::new("Min", "Minute"));
        assert_eq!(name, "Induct 101 Min");
    }

    #[test]
    fn test_compose_all_is_station_major() {
        let template = RangeNameTemplate::new("${granularity}-${station}");
        let names = template.compose_all(
            &[Station::new("A"), Station::new("B")],
            &[Granularity::new("Min", "Minute"), Granularity::new("Day", "Daily")],
        );
        assert_eq!(names, vec!["Min-A", "Day-A", "Min-B", "Day-B"]);
    }

    #[test]
    fn test_expand_template_leaves_unknown_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("station".to_string(), "Induct 7".to_string());
        assert_eq!(expand_template("${station} ${other}", &vars), "Induct 7 ${other}");
    }
}
