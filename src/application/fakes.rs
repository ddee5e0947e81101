// In-memory repository used by application tests
use crate::application::sheet_repository::{FetchError, RawRange, SheetRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Replays scripted batch results; once the script runs out, `fallback` is served
pub(crate) struct FakeSheetRepository {
    script: Mutex<VecDeque<Result<Vec<RawRange>, FetchError>>>,
    fallback: Result<Vec<RawRange>, FetchError>,
    last_modified: Option<DateTime<Utc>>,
    calls: AtomicUsize,
    requested: Mutex<Vec<Vec<String>>>,
}

impl FakeSheetRepository {
    pub(crate) fn serving(ranges: Vec<RawRange>) -> Self {
        Self::scripted(Vec::new(), Ok(ranges))
    }

    pub(crate) fn scripted(
        script: Vec<Result<Vec<RawRange>, FetchError>>,
        fallback: Result<Vec<RawRange>, FetchError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            last_modified: None,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_last_modified(mut self, at: DateTime<Utc>) -> Self {
        self.last_modified = Some(at);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requested(&self) -> Vec<Vec<String>> {
        self.requested.lock().unwrap().clone()
    }
}

/// Worksheet with the standard header followed by `(timestamp, category, value)` rows
pub(crate) fn sheet(name: &str, rows: &[(&str, &str, &str)]) -> RawRange {
    let mut cells = vec![vec![
        "Serialization".to_string(),
        "Category".to_string(),
        "Value".to_string(),
    ]];
    cells.extend(
        rows.iter()
            .map(|(t, c, v)| vec![t.to_string(), c.to_string(), v.to_string()]),
    );
    RawRange::new(name, cells)
}

#[async_trait]
impl SheetRepository for FakeSheetRepository {
    async fn batch_get(&self, _spreadsheet_id: &str, range_names: &[String]) -> Result<Vec<RawRange>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(range_names.to_vec());
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    async fn last_modified(&self, _spreadsheet_id: &str) -> anyhow::Result<DateTime<Utc>> {
        self.last_modified
            .ok_or_else(|| anyhow::anyhow!("metadata lookup failed"))
    }
}
