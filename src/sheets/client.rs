use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error};

use crate::business::SheetStore;
use crate::config::SheetsConfig;
use crate::sheets::error::SheetsError;
use crate::sheets::models::*;

/// Client for one spreadsheet through the Sheets v4 REST API.
pub struct SheetsClient {
    base_url: Url,
    spreadsheet_id: String,
    client: reqwest::Client,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetsError> {
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| SheetsError::InvalidUrl(format!("{}: {}", config.api_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SheetsError::InvalidUrl(config.api_url));
        }

        if config.access_token.is_empty() {
            return Err(SheetsError::AuthenticationError(
                "Sheets access token is required".to_string(),
            ));
        }
        if config.spreadsheet_id.is_empty() {
            return Err(SheetsError::ValidationError(
                "Spreadsheet id is required".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", config.access_token)).map_err(|e| {
                SheetsError::AuthenticationError(format!("Invalid token format: {}", e))
            })?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(SheetsError::NetworkError)?;

        Ok(Self {
            base_url,
            spreadsheet_id: config.spreadsheet_id,
            client,
        })
    }

    /// `{api}/v4/spreadsheets/{segments...}`, each segment percent-encoded.
    fn build_url(&self, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);
        Ok(url)
    }

    fn values_url(&self, range: &str) -> Result<Url, SheetsError> {
        self.build_url(&[self.spreadsheet_id.as_str(), "values", range])
    }

    async fn check(response: reqwest::Response) -> Result<String, SheetsError> {
        let status = response.status();
        let text = response.text().await.map_err(SheetsError::NetworkError)?;

        if !status.is_success() {
            error!("Sheets API error: {} - {}", status, text);
            return Err(SheetsError::from_response(status.as_u16(), &text));
        }
        Ok(text)
    }

    /// Read a range; rows come back as the API reports them.
    pub async fn get_values(&self, range: &str) -> Result<ValueRange, SheetsError> {
        let url = self.values_url(range)?;
        debug!("Reading sheet range: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(SheetsError::NetworkError)?;

        let text = Self::check(response).await?;
        serde_json::from_str(&text).map_err(SheetsError::SerializationError)
    }

    /// Add a worksheet tab.
    pub async fn add_sheet(&self, title: &str) -> Result<(), SheetsError> {
        let batch = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.build_url(&[batch.as_str()])?;
        debug!("Adding sheet '{}': {}", title, url);

        let response = self
            .client
            .post(url)
            .json(&BatchUpdateRequest::add_sheet(title))
            .send()
            .await
            .map_err(SheetsError::NetworkError)?;

        Self::check(response).await.map(|_| ())
    }

    /// Overwrite a range with literal (`RAW`) values.
    pub async fn update_values(
        &self,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<(), SheetsError> {
        let url = self.values_url(range)?;
        debug!("Writing {} rows to sheet range: {}", values.len(), url);

        let response = self
            .client
            .put(url)
            .query(&[("valueInputOption", "RAW")])
            .json(&ValueRange::rows(range, values))
            .send()
            .await
            .map_err(SheetsError::NetworkError)?;

        Self::check(response).await.map(|_| ())
    }

    /// Clear every cell in a range.
    pub async fn clear_values(&self, range: &str) -> Result<(), SheetsError> {
        let clear = format!("{}:clear", range);
        let url = self.build_url(&[self.spreadsheet_id.as_str(), "values", clear.as_str()])?;
        debug!("Clearing sheet range: {}", url);

        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(SheetsError::NetworkError)?;

        Self::check(response).await.map(|_| ())
    }
}

#[async_trait]
impl SheetStore for SheetsClient {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<Value>>, SheetsError> {
        Ok(self.get_values(range).await?.values)
    }

    async fn add_sheet(&self, title: &str) -> Result<(), SheetsError> {
        SheetsClient::add_sheet(self, title).await
    }

    async fn write_range(&self, range: &str, rows: Vec<Vec<Value>>) -> Result<(), SheetsError> {
        self.update_values(range, rows).await
    }

    async fn clear_range(&self, range: &str) -> Result<(), SheetsError> {
        self.clear_values(range).await
    }
}
