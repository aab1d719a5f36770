use std::process::ExitCode;
use std::sync::Arc;

use order_sheet_sync::business::SyncService;
use order_sheet_sync::config::Config;
use order_sheet_sync::error::SyncError;
use order_sheet_sync::logging::init;
use order_sheet_sync::magento::MagentoClient;
use order_sheet_sync::sheets::SheetsClient;

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine; the environment may already be set.
    let _ = dotenvy::dotenv();
    init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Order sync failed: {}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<(), SyncError> {
    let config = Config::from_env()?;
    let month = config.sync.target_month();

    let store = Arc::new(MagentoClient::new(config.magento.clone())?);
    let sheet = Arc::new(SheetsClient::new(config.sheets.clone())?);
    let service = SyncService::new(store, sheet, &config);

    let report = service.run(month).await?;
    if !report.write_back_failures.is_empty() {
        tracing::warn!(
            "Store notes not saved for orders {:?}; they will not be retried automatically",
            report.write_back_failures
        );
    }
    Ok(())
}
