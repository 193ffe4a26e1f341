//! Campo sync runner - headless wiring of the capture/sync core.
//!
//! Runs the same flow the mobile UI drives: refresh the snapshot for the
//! configured agent, push everything pending, and report what is left.

use campo_client::{Config, FileStore, HttpRemoteApi, Reconciler, SnapshotLoader};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "campo_client=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(agent = %config.agent_id, url = %config.base_url, "starting sync run");

    let store = Arc::new(FileStore::open(&config.data_dir)?);
    let remote = HttpRemoteApi::new(&config)?;

    let loader = SnapshotLoader::new(remote.clone(), store.clone());
    let refresh = loader.refresh(&config.agent_id).await?;
    if refresh.is_stale() {
        tracing::warn!("working from the stored snapshot");
    }

    let reconciler = Reconciler::new(remote, store);
    let report = reconciler.synchronize().await?;
    tracing::info!(
        visits_synced = report.visits_synced,
        visits_failed = report.visits_failed,
        properties_synced = report.properties_synced,
        properties_failed = report.properties_failed,
        "sync pass complete"
    );

    let pending = reconciler.pending_work().await?;
    if pending.is_clear() {
        tracing::info!("all records confirmed by the remote service");
    } else {
        tracing::info!(%pending, "run again when connectivity returns");
    }

    Ok(())
}
