use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("Sheets API error: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Range not found: {0}")]
    NotFound(String),

    /// The range names a tab the spreadsheet does not have.
    #[error("Sheet tab not found: {0}")]
    TabNotFound(String),

    #[error("Invalid request: {0}")]
    ValidationError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorStatus,
}

#[derive(Debug, Deserialize)]
struct ErrorStatus {
    message: String,
}

impl SheetsError {
    /// Map a failed response, unwrapping the `{"error": {"message": ..}}`
    /// envelope when present.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.to_string());
        Self::from_status_code(status, message)
    }

    pub fn from_status_code(status: u16, message: String) -> Self {
        match status {
            401 | 403 => SheetsError::AuthenticationError(message),
            404 => SheetsError::NotFound(message),
            400 if message.contains("Unable to parse range") => SheetsError::TabNotFound(message),
            400 | 422 => SheetsError::ValidationError(message),
            _ => SheetsError::ApiError(format!("HTTP {}: {}", status, message)),
        }
    }
}
