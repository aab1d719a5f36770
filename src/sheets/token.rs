use std::path::Path;

use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;

use crate::config::ConfigError;

/// OAuth token file as written by the authorization helper.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Expiry instant, if any. The zero time (`0001-01-01T00:00:00Z`) means
    /// the token does not expire.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|expiry| expiry.year() > 1)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().map(|expiry| expiry <= now).unwrap_or(false)
    }
}

/// Read the access token from a token file, rejecting expired tokens.
pub fn load_access_token(path: &Path) -> Result<String, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::TokenFile {
        path: path.display().to_string(),
        source,
    })?;
    let token: StoredToken = serde_json::from_str(&raw).map_err(|source| ConfigError::TokenFormat {
        path: path.display().to_string(),
        source,
    })?;

    if token.is_expired(Utc::now()) {
        if let Some(expiry) = token.expires_at() {
            return Err(ConfigError::TokenExpired(expiry));
        }
    }
    if token.access_token.is_empty() {
        return Err(ConfigError::Missing("access_token".to_string()));
    }
    Ok(token.access_token)
}
