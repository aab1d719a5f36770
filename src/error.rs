use thiserror::Error;

use crate::config::ConfigError;
use crate::magento::MagentoError;
use crate::sheets::SheetsError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store request failed: {0}")]
    Store(#[from] MagentoError),

    #[error("Spreadsheet request failed: {0}")]
    Sheet(#[from] SheetsError),
}

impl SyncError {
    /// Process exit code for a failed run.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::Config(_) => 78,
            SyncError::Store(MagentoError::AuthenticationError(_))
            | SyncError::Sheet(SheetsError::AuthenticationError(_)) => 77,
            SyncError::Store(_) | SyncError::Sheet(_) => 69,
        }
    }
}
