use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::business::MatchStrategy;
use crate::domain::{MonthEnd, SyncMonth};
use crate::sheets::token::load_access_token;

pub const DEFAULT_SHEETS_API_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_STORE_NOTE_RANGE: &str = "!X2:AA";
pub const DEFAULT_ORDER_ID_RANGE: &str = "!B2:B";
pub const DEFAULT_TOKEN_FILE: &str = "token.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },

    #[error("Unable to read token file {path}: {source}")]
    TokenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to parse token file {path}: {source}")]
    TokenFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Access token expired at {0}")]
    TokenExpired(DateTime<Utc>),
}

#[derive(Debug, Clone)]
pub struct MagentoConfig {
    pub base_url: String,
    pub bearer_token: String,
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub api_url: String,
    pub spreadsheet_id: String,
    pub access_token: String,
    /// Suffix of the fingerprint/status/note/invoice-id columns, e.g. `!X2:AA`.
    pub store_note_range: String,
    /// Suffix of the order id column, e.g. `!B2:B`.
    pub order_id_range: String,
}

#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Month to sync; the current month when unset.
    pub month: Option<SyncMonth>,
    pub match_by: MatchStrategy,
    pub month_end: MonthEnd,
}

impl SyncConfig {
    pub fn target_month(&self) -> SyncMonth {
        self.month.unwrap_or_else(SyncMonth::current)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub magento: MagentoConfig,
    pub sheets: SheetsConfig,
    pub sync: SyncConfig,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| get(key).ok_or_else(|| ConfigError::Missing(key.to_string()));

        let magento = MagentoConfig {
            base_url: require("MAGENTO_BASE_REST_API")?,
            bearer_token: require("MAGENTO_BEARER_TOKEN")?,
        };

        let access_token = match get("GOOGLE_ACCESS_TOKEN") {
            Some(token) => token,
            None => {
                let path = get("GOOGLE_TOKEN_FILE").unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());
                load_access_token(&PathBuf::from(path))?
            }
        };

        let sheets = SheetsConfig {
            api_url: get("GOOGLE_SHEETS_API_URL")
                .unwrap_or_else(|| DEFAULT_SHEETS_API_URL.to_string()),
            spreadsheet_id: require("GOOGLE_SHEET_ID")?,
            access_token,
            store_note_range: get("STORE_NOTE_DATA_RANGE")
                .unwrap_or_else(|| DEFAULT_STORE_NOTE_RANGE.to_string()),
            order_id_range: get("ORDER_ID_RANGE")
                .unwrap_or_else(|| DEFAULT_ORDER_ID_RANGE.to_string()),
        };

        let sync = SyncConfig {
            month: parse_optional(&get, "SYNC_MONTH")?,
            match_by: parse_optional(&get, "SYNC_MATCH_BY")?.unwrap_or_default(),
            month_end: parse_optional(&get, "SYNC_MONTH_END")?.unwrap_or_default(),
        };

        Ok(Self {
            magento,
            sheets,
            sync,
        })
    }
}

fn parse_optional<T, G>(get: &G, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = String>,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|raw| {
            raw.parse().map_err(|reason| ConfigError::Invalid {
                var: var.to_string(),
                reason,
            })
        })
        .transpose()
}
