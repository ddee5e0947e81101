// Range loader - batched fetch with retry, parsing and caching
use crate::application::retry::{RetryPolicy, Sleeper, TokioSleeper, retry_with_backoff};
use crate::application::sheet_repository::{FetchError, RawRange, SheetRepository};
use crate::application::table_cache::TableCache;
use crate::domain::range_table::{ColumnNames, LoadedRanges, RangeTable};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct RangeLoader {
    repository: Arc<dyn SheetRepository>,
    sleeper: Arc<dyn Sleeper>,
    spreadsheet_id: String,
    policy: RetryPolicy,
    columns: ColumnNames,
    cache: TableCache,
}

impl RangeLoader {
    pub fn new(
        repository: Arc<dyn SheetRepository>,
        spreadsheet_id: String,
        policy: RetryPolicy,
        columns: ColumnNames,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            repository,
            sleeper: Arc::new(TokioSleeper),
            spreadsheet_id,
            policy,
            columns,
            cache: TableCache::new(cache_ttl),
        }
    }

    #[cfg(test)]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Tables for every requested range, served from cache while fresh
    pub async fn load(&self, range_names: &[String]) -> Arc<LoadedRanges> {
        if range_names.is_empty() {
            tracing::debug!("no ranges requested, skipping fetch");
            return Arc::new(LoadedRanges::new(BTreeMap::new()));
        }

        self.cache
            .get_or_load(range_names, || self.fetch(range_names))
            .await
    }

    pub async fn invalidate(&self) {
        self.cache.invalidate().await;
    }

    /// One batched fetch, retried as a whole. Never fails: on error every
    /// requested range maps to an empty table and a warning is attached.
    async fn fetch(&self, range_names: &[String]) -> LoadedRanges {
        tracing::info!(
            spreadsheet_id = %self.spreadsheet_id,
            ranges = range_names.len(),
            "fetching ranges"
        );

        let result = retry_with_backoff(&self.policy, self.sleeper.as_ref(), FetchError::is_transient, |_| {
            self.repository.batch_get(&self.spreadsheet_id, range_names)
        })
        .await;

        match result {
            Ok(raw) => {
                let loaded = self.parse_ranges(raw);
                tracing::info!(
                    ranges = loaded.tables.len(),
                    rows = loaded.tables.values().map(RangeTable::len).sum::<usize>(),
                    "ranges loaded"
                );
                loaded
            }
            Err(failure) => {
                let warning = if failure.exhausted {
                    format!("Failed to load data after {} attempts: {}", failure.attempts, failure.error)
                } else {
                    format!("Failed to load data: {}", failure.error)
                };
                tracing::error!(
                    code = failure.error.error_code(),
                    attempts = failure.attempts,
                    "{}",
                    warning
                );
                LoadedRanges::degraded(range_names, warning)
            }
        }
    }

    fn parse_ranges(&self, raw: Vec<RawRange>) -> LoadedRanges {
        let mut tables = BTreeMap::new();

        for range in raw {
            let (table, report) = RangeTable::from_rows(&range.rows, &self.columns);

            if !report.missing_columns.is_empty() {
                tracing::warn!(
                    range = %range.name,
                    missing = ?report.missing_columns,
                    "range is missing required columns"
                );
            } else if report.dropped > 0 {
                tracing::debug!(
                    range = %range.name,
                    kept = report.kept,
                    dropped = report.dropped,
                    "dropped unparseable rows"
                );
            }

            tables.insert(range.name, table);
        }

        LoadedRanges::new(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fakes::{FakeSheetRepository, sheet};
    use crate::application::retry::tests::RecordingSleeper;
    use crate::domain::range_table::RangeRow;

    fn names(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn loader(repo: Arc<FakeSheetRepository>, sleeper: Arc<RecordingSleeper>) -> RangeLoader {
        RangeLoader::new(
            repo,
            "sheet-id".to_string(),
            RetryPolicy::default(),
            ColumnNames::default(),
            Duration::from_secs(300),
        )
        .with_sleeper(sleeper)
    }

    fn transient() -> FetchError {
        FetchError::RateLimited { status: 429 }
    }

    #[tokio::test]
    async fn test_malformed_rows_dropped_from_loaded_table() {
        let repo = Arc::new(FakeSheetRepository::serving(vec![sheet(
            "Induct 101 Min",
            &[("08:00", "Tote_util", "55"), ("08:01", "Tote_util", "bad"), ("08:01", "Combi_util", "60")],
        )]));
        let loader = loader(repo, Arc::new(RecordingSleeper::default()));

        let loaded = loader.load(&names(&["Induct 101 Min"])).await;
        let table = loaded.table("Induct 101 Min").unwrap();

        assert!(!loaded.is_degraded());
        assert_eq!(
            table.rows,
            vec![RangeRow::new("08:00", "Tote_util", 55.0), RangeRow::new("08:01", "Combi_util", 60.0)]
        );
    }

    #[tokio::test]
    async fn test_all_ranges_fetched_in_one_call() {
        let repo = Arc::new(FakeSheetRepository::serving(vec![
            sheet("Induct 101 Min", &[("08:00", "Tote_util", "1")]),
            sheet("Induct 101 Hour", &[("08", "Tote_util", "2")]),
        ]));
        let loader = loader(repo.clone(), Arc::new(RecordingSleeper::default()));
        let requested = names(&["Induct 101 Min", "Induct 101 Hour"]);

        let loaded = loader.load(&requested).await;

        assert_eq!(repo.calls(), 1);
        assert_eq!(repo.requested(), vec![requested]);
        assert_eq!(loaded.tables.len(), 2);
    }

    #[tokio::test]
    async fn test_retries_whole_batch_then_succeeds() {
        let repo = Arc::new(FakeSheetRepository::scripted(
            vec![Err(transient()), Err(FetchError::Transport { message: "reset".into() })],
            Ok(vec![sheet("Induct 101 Min", &[("08:00", "Tote_util", "55")])]),
        ));
        let sleeper = Arc::new(RecordingSleeper::default());
        let loader = loader(repo.clone(), sleeper.clone());

        let loaded = loader.load(&names(&["Induct 101 Min"])).await;

        assert_eq!(repo.calls(), 3);
        assert_eq!(sleeper.recorded(), vec![Duration::from_secs(1), Duration::from_secs(2)]);
        assert!(!loaded.is_degraded());
        assert_eq!(loaded.table("Induct 101 Min").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_degrades_to_empty_tables() {
        let repo = Arc::new(FakeSheetRepository::scripted(Vec::new(), Err(transient())));
        let sleeper = Arc::new(RecordingSleeper::default());
        let loader = loader(repo.clone(), sleeper.clone());
        let requested = names(&["Induct 101 Min", "Induct 101 Day"]);

        let loaded = loader.load(&requested).await;

        assert_eq!(repo.calls(), 5);
        assert_eq!(sleeper.recorded().len(), 4);
        assert!(loaded.is_degraded());
        assert!(loaded.warning.as_deref().unwrap().contains("after 5 attempts"));
        assert_eq!(loaded.tables.len(), 2);
        assert!(loaded.tables.values().all(RangeTable::is_empty));
    }

    #[tokio::test]
    async fn test_non_transient_error_is_not_retried() {
        let repo = Arc::new(FakeSheetRepository::scripted(
            Vec::new(),
            Err(FetchError::Rejected { status: 403, body: "forbidden".into() }),
        ));
        let sleeper = Arc::new(RecordingSleeper::default());
        let loader = loader(repo.clone(), sleeper.clone());

        let loaded = loader.load(&names(&["Induct 101 Min"])).await;

        assert_eq!(repo.calls(), 1);
        assert!(sleeper.recorded().is_empty());
        assert!(loaded.is_degraded());
        assert!(loaded.table("Induct 101 Min").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_load_within_ttl_is_cached() {
        let repo = Arc::new(FakeSheetRepository::serving(vec![sheet(
            "Induct 101 Min",
            &[("08:00", "Tote_util", "55")],
        )]));
        let loader = loader(repo.clone(), Arc::new(RecordingSleeper::default()));
        let requested = names(&["Induct 101 Min"]);

        let first = loader.load(&requested).await;
        let second = loader.load(&requested).await;
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(repo.calls(), 1);

        loader.invalidate().await;
        let third = loader.load(&requested).await;
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried_on_next_call() {
        let repo = Arc::new(FakeSheetRepository::scripted(
            vec![Err(FetchError::Decode { message: "truncated".into() })],
            Ok(vec![sheet("Induct 101 Min", &[("08:00", "Tote_util", "55")])]),
        ));
        let loader = loader(repo.clone(), Arc::new(RecordingSleeper::default()));
        let requested = names(&["Induct 101 Min"]);

        assert!(loader.load(&requested).await.is_degraded());
        assert!(!loader.load(&requested).await.is_degraded());
        assert_eq!(repo.calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_request_skips_fetch() {
        let repo = Arc::new(FakeSheetRepository::serving(Vec::new()));
        let loader = loader(repo.clone(), Arc::new(RecordingSleeper::default()));

        let loaded = loader.load(&[]).await;

        assert!(loaded.tables.is_empty());
        assert_eq!(repo.calls(), 0);
    }
}
