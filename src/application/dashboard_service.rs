// Dashboard service - Use case for building the induct dashboard
use crate::application::range_loader::RangeLoader;
use crate::application::sheet_repository::SheetRepository;
use crate::application::view_renderer::render_stations;
use crate::domain::dashboard::{Dashboard, LastModified};
use crate::domain::palette::CategoryPalette;
use crate::domain::range_table::LoadedRanges;
use crate::domain::station::{Granularity, RangeNameTemplate, Station};
use crate::infrastructure::config::DashboardConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Clone)]
pub struct DashboardService {
    loader: Arc<RangeLoader>,
    repository: Arc<dyn SheetRepository>,
    title: String,
    stations: Vec<Station>,
    granularities: Vec<Granularity>,
    palette: CategoryPalette,
    template: RangeNameTemplate,
    range_names: Vec<String>,
    refresh_interval: Duration,
}

impl DashboardService {
    pub fn new(loader: Arc<RangeLoader>, repository: Arc<dyn SheetRepository>, config: &DashboardConfig) -> Self {
        let stations = config.stations();
        let granularities = config.granularities.clone();
        let template = config.range_name_template();
        let range_names = template.compose_all(&stations, &granularities);

        Self {
            loader,
            repository,
            title: config.title.clone(),
            stations,
            granularities,
            palette: config.palette(),
            template,
            range_names,
            refresh_interval: Duration::from_secs(config.refresh_interval_secs),
        }
    }

    pub fn range_names(&self) -> &[String] {
        &self.range_names
    }

    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub async fn build_dashboard(&self, show_value_markers: bool) -> Dashboard {
        let tables = self.tables().await;
        let tabs = render_stations(
            &tables,
            &self.stations,
            &self.granularities,
            &self.palette,
            &self.template,
            show_value_markers,
        );

        Dashboard {
            title: self.title.clone(),
            caption: refresh_caption(self.refresh_interval),
            tabs,
            warning: tables.warning.clone(),
            last_modified: self.last_modified().await,
            show_value_markers,
            refresh_interval_secs: self.refresh_interval.as_secs(),
        }
    }

    /// Cached tables for every configured range
    pub async fn tables(&self) -> Arc<LoadedRanges> {
        self.loader.load(&self.range_names).await
    }

    /// Drop the cached tables and fetch again
    pub async fn refresh(&self) -> Arc<LoadedRanges> {
        tracing::info!("refreshing range tables");
        self.loader.invalidate().await;
        self.tables().await
    }

    async fn last_modified(&self) -> LastModified {
        match self.repository.last_modified(self.loader.spreadsheet_id()).await {
            Ok(at) => LastModified::At(at),
            Err(e) => {
                tracing::warn!("Could not fetch last modified time: {:#}", e);
                LastModified::Unavailable
            }
        }
    }
}

fn refresh_caption(interval: Duration) -> String {
    let secs = interval.as_secs();
    let every = match secs {
        60 => "minute".to_string(),
        s if s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "second".to_string(),
        s => format!("{} seconds", s),
    };
    format!("Auto-refreshes every {}. You can also trigger a manual refresh below.", every)
}

/// Warm the cache now, then invalidate and re-fetch on every tick
pub fn spawn_refresh_timer(service: DashboardService) -> JoinHandle<()> {
    let period = service.refresh_interval().max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick completes immediately
        ticker.tick().await;
        let warmed = service.tables().await;
        tracing::info!(ranges = warmed.tables.len(), degraded = warmed.is_degraded(), "range cache warmed");

        loop {
            ticker.tick().await;
            let refreshed = service.refresh().await;
            if refreshed.is_degraded() {
                tracing::warn!("scheduled refresh degraded");
            }
        }
    })
}
