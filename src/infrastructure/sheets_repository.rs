// Google Sheets repository implementation
use crate::application::sheet_repository::{FetchError, RawRange, SheetRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct GoogleSheetsRepository {
    client: reqwest::Client,
    sheets_api_base: String,
    drive_api_base: String,
    api_key: Option<String>,
    bearer_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchGetResponse {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    modified_time: String,
}

impl GoogleSheetsRepository {
    pub fn new(
        sheets_api_base: String,
        drive_api_base: String,
        api_key: Option<String>,
        bearer_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            sheets_api_base: sheets_api_base.trim_end_matches('/').to_string(),
            drive_api_base: drive_api_base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            bearer_token: bearer_token.filter(|t| !t.is_empty()),
        })
    }

    fn key_param(&self) -> String {
        self.api_key
            .as_ref()
            .map(|key| format!("&key={}", urlencoding::encode(key)))
            .unwrap_or_default()
    }

    fn build_batch_get_url(&self, spreadsheet_id: &str, range_names: &[String]) -> String {
        let ranges: String = range_names
            .iter()
            .map(|name| format!("&ranges={}", urlencoding::encode(&whole_sheet_range(name))))
            .collect();

        format!(
            "{}/spreadsheets/{}/values:batchGet?majorDimension=ROWS&valueRenderOption=UNFORMATTED_VALUE&dateTimeRenderOption=FORMATTED_STRING{}{}",
            self.sheets_api_base,
            urlencoding::encode(spreadsheet_id),
            ranges,
            self.key_param()
        )
    }

    fn build_metadata_url(&self, spreadsheet_id: &str) -> String {
        format!(
            "{}/files/{}?fields=modifiedTime&supportsAllDrives=true{}",
            self.drive_api_base,
            urlencoding::encode(spreadsheet_id),
            self.key_param()
        )
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Accept", "application/json");
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// A1 notation for a whole worksheet; quotes inside the name are doubled
fn whole_sheet_range(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

fn classify_status(status: StatusCode, body: String) -> FetchError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        FetchError::RateLimited { status: status.as_u16() }
    } else if status.is_server_error() {
        FetchError::Unavailable { status: status.as_u16(), body }
    } else {
        FetchError::Rejected { status: status.as_u16(), body }
    }
}

fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Pair the response's value ranges with the requested names by position
fn decode_batch_response(range_names: &[String], body: &str) -> Result<Vec<RawRange>, FetchError> {
    let response: BatchGetResponse = serde_json::from_str(body).map_err(|e| FetchError::Decode {
        message: e.to_string(),
    })?;

    if response.value_ranges.len() != range_names.len() {
        tracing::warn!(
            requested = range_names.len(),
            returned = response.value_ranges.len(),
            "batchGet returned a different number of ranges than requested"
        );
    }

    Ok(range_names
        .iter()
        .zip(response.value_ranges)
        .map(|(name, value_range)| {
            tracing::trace!(range = %name, resolved = ?value_range.range, rows = value_range.values.len());
            let rows = value_range
                .values
                .into_iter()
                .map(|row| row.into_iter().map(cell_to_string).collect())
                .collect();
            RawRange::new(name.clone(), rows)
        })
        .collect())
}

/// Parse a Drive `files.get` body into the file's modification time
fn decode_modified_time(body: &str) -> Result<DateTime<Utc>> {
    let file: DriveFile = serde_json::from_str(body).context("Failed to parse metadata response")?;

    let modified = DateTime::parse_from_rfc3339(&file.modified_time)
        .with_context(|| format!("Invalid modifiedTime '{}'", file.modified_time))?;

    Ok(modified.with_timezone(&Utc))
}

#[async_trait]
impl SheetRepository for GoogleSheetsRepository {
    async fn batch_get(&self, spreadsheet_id: &str, range_names: &[String]) -> Result<Vec<RawRange>, FetchError> {
        let url = self.build_batch_get_url(spreadsheet_id, range_names);
        tracing::debug!(ranges = range_names.len(), "Executing batchGet");

        let response = self
            .request(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport { message: e.to_string() })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport { message: e.to_string() })?;

        if !status.is_success() {
            return Err(classify_status(status, body));
        }

        decode_batch_response(range_names, &body)
    }

    async fn last_modified(&self, spreadsheet_id: &str) -> Result<DateTime<Utc>> {
        let url = self.build_metadata_url(spreadsheet_id);

        let response = self
            .request(&url)
            .send()
            .await
            .context("Failed to send metadata request")?;

        let status = response.status();
        let body = response.text().await.context("Failed to read metadata response")?;

        if !status.is_success() {
            anyhow::bail!("Metadata lookup failed with status {}: {}", status, body);
        }

        decode_modified_time(&body)
    }
}
