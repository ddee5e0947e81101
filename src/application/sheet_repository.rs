// Repository trait for spreadsheet data access
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Cells of one named range, normalized to strings, header row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRange {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl RawRange {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("rate limited by the spreadsheet API (status {status})")]
    RateLimited { status: u16 },

    #[error("spreadsheet API unavailable (status {status}): {body}")]
    Unavailable { status: u16, body: String },

    #[error("transport error: {message}")]
    Transport { message: String },

    #[error("request rejected (status {status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl FetchError {
    /// Rate limiting, server-side outages and transport failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::RateLimited { .. } | FetchError::Unavailable { .. } | FetchError::Transport { .. }
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            FetchError::RateLimited { .. } => "sheets.rate_limited",
            FetchError::Unavailable { .. } => "sheets.unavailable",
            FetchError::Transport { .. } => "sheets.transport_failed",
            FetchError::Rejected { .. } => "sheets.request_rejected",
            FetchError::Decode { .. } => "sheets.decode_failed",
        }
    }
}

#[async_trait]
pub trait SheetRepository: Send + Sync {
    /// Fetch every named range in a single batched call.
    /// Results come back in the order the names were given.
    async fn batch_get(&self, spreadsheet_id: &str, range_names: &[String]) -> Result<Vec<RawRange>, FetchError>;

    /// Last modification time of the backing file
    async fn last_modified(&self, spreadsheet_id: &str) -> anyhow::Result<DateTime<Utc>>;
}
