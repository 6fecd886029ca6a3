use std::time::Duration;

use gatekeeper_core::GateConfig;
use gatekeeper_state::ExpirySweeper;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::store_path;

/// Remove expired records once, or on every configured interval with
/// `follow`. The database is opened per sweep so grant and lookup commands
/// can run alongside a watching sweeper.
pub async fn sweep(config: &GateConfig, follow: bool) -> anyhow::Result<()> {
    let sweeper = ExpirySweeper::at_path(
        store_path(config)?,
        Duration::from_secs(config.expiry.sweep_interval_secs.max(1)),
    );

    if !follow {
        let removed = sweeper.sweep_once()?;
        println!("✓ Removed {removed} expired records");
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        sweeper.run(shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    stop(shutdown_tx, handle).await
}

/// Signal shutdown and wait for the task; a panicked task is an error.
async fn stop(shutdown_tx: watch::Sender<bool>, handle: JoinHandle<()>) -> anyhow::Result<()> {
    let _ = shutdown_tx.send(true);
    handle.await?;
    Ok(())
}
