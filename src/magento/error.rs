use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::lenient::cell_text;

#[derive(Error, Debug)]
pub enum MagentoError {
    #[error("Store API error: {0}")]
    ApiError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Error body of the store REST API: a message template and its parameters,
/// either positional (`%1`) or named (`%fieldName`).
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    parameters: Value,
}

impl ErrorBody {
    fn render(self) -> String {
        let mut message = self.message;
        match self.parameters {
            Value::Array(values) => {
                // Highest index first so `%1` does not eat into `%10`.
                for (i, value) in values.iter().enumerate().rev() {
                    message = message.replace(&format!("%{}", i + 1), &cell_text(value));
                }
            }
            Value::Object(values) => {
                for (name, value) in &values {
                    message = message.replace(&format!("%{}", name), &cell_text(value));
                }
            }
            _ => {}
        }
        message
    }
}

impl MagentoError {
    /// Map a failed response, rendering the store's message template when the
    /// body carries one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .map(ErrorBody::render)
            .unwrap_or_else(|_| body.to_string());
        Self::from_status_code(status, message)
    }

    pub fn from_status_code(status: u16, message: String) -> Self {
        match status {
            401 | 403 => MagentoError::AuthenticationError(message),
            404 => MagentoError::NotFound(message),
            400 | 422 => MagentoError::ValidationError(message),
            _ => MagentoError::ApiError(format!("HTTP {}: {}", status, message)),
        }
    }
}
