#![allow(clippy::result_large_err)]

//! Maintenance sweep runner: purges reports past their retention window and
//! archives dormant bookmaker profiles. Intended to run from a scheduler.

use dotenvy::dotenv;
use stakeledger::{
    config::{database, settings},
    core::lifecycle,
    errors::Result,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    let settings = settings::load_default_settings()?;
    info!(
        retention_days = settings.retention_days,
        archive_threshold_days = settings.archive_threshold_days,
        "Loaded settings"
    );

    let db = database::create_connection().await?;
    database::create_tables(&db).await?;

    let purged = lifecycle::purge_deleted_reports(&db, settings.retention_days).await?;
    let archived =
        lifecycle::archive_dormant_bookmakers(&db, settings.archive_threshold_days).await?;

    info!(purged, archived, "Maintenance sweep complete");
    Ok(())
}
