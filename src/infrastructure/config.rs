use crate::application::retry::RetryPolicy;
use crate::domain::palette::{CategoryColor, CategoryPalette, DEFAULT_SERIES_COLOR};
use crate::domain::range_table::ColumnNames;
use crate::domain::station::{DEFAULT_RANGE_NAME_TEMPLATE, Granularity, RangeNameTemplate, Station};
use serde::Deserialize;
use std::time::Duration;

const ENV_PREFIX: &str = "INDUCT";

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsConfig {
    pub sheets: SheetsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SheetsSettings {
    pub spreadsheet_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    #[serde(default = "default_sheets_api_base")]
    pub sheets_api_base: String,
    #[serde(default = "default_drive_api_base")]
    pub drive_api_base: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_drive_api_base() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl SheetsSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.spreadsheet_id.trim().is_empty(), "sheets.spreadsheet_id must not be empty");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub title: String,
    pub stations: Vec<String>,
    pub granularities: Vec<Granularity>,
    pub range_name_template: String,
    pub columns: ColumnNames,
    pub categories: Vec<CategoryColor>,
    pub default_color: String,
    pub refresh_interval_secs: u64,
    /// Initial state of the markers toggle
    pub show_value_markers: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "🔧 Induct Data Monitor 🚀".to_string(),
            stations: vec!["Induct 105".to_string(), "Induct 106".to_string()],
            granularities: Granularity::defaults(),
            range_name_template: DEFAULT_RANGE_NAME_TEMPLATE.to_string(),
            columns: ColumnNames::default(),
            categories: CategoryPalette::default_entries(),
            default_color: DEFAULT_SERIES_COLOR.to_string(),
            refresh_interval_secs: 300,
            show_value_markers: false,
        }
    }
}

impl DashboardConfig {
    pub fn stations(&self) -> Vec<Station> {
        self.stations.iter().map(|s| Station::new(s.trim())).collect()
    }

    pub fn palette(&self) -> CategoryPalette {
        CategoryPalette::new(self.categories.clone(), self.default_color.clone())
    }

    pub fn range_name_template(&self) -> RangeNameTemplate {
        RangeNameTemplate::new(self.range_name_template.clone())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.stations.is_empty(), "dashboard.stations must list at least one station");
        anyhow::ensure!(
            !self.granularities.is_empty(),
            "dashboard.granularities must list at least one granularity"
        );
        anyhow::ensure!(self.refresh_interval_secs > 0, "dashboard.refresh_interval_secs must be positive");
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

pub fn load_sheets_config() -> anyhow::Result<SheetsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/sheets"))
        .add_source(environment())
        .build()?;

    let config: SheetsConfig = settings.try_deserialize()?;
    config.sheets.validate()?;
    Ok(config)
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(environment())
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    config.dashboard.validate()?;
    Ok(config)
}
