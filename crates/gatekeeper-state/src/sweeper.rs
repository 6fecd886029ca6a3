//! Background removal of expired records.

use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::error::StateResult;
use crate::store::StateStore;

/// Where the sweeper finds its store.
enum SweepTarget {
    /// A handle shared with the rest of the process.
    Shared(StateStore),
    /// A database file opened for each sweep and closed right after, so the
    /// file lock is free for other processes between ticks.
    Path(PathBuf),
}

/// Periodically runs [`StateStore::sweep_expired`] until shut down.
pub struct ExpirySweeper {
    target: SweepTarget,
    interval: Duration,
}

impl ExpirySweeper {
    /// Sweep through a handle this process already holds.
    pub fn new(state: StateStore, interval: Duration) -> Self {
        Self {
            target: SweepTarget::Shared(state),
            interval,
        }
    }

    /// Sweep the database at `path`, holding it open only while a sweep runs.
    pub fn at_path(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            target: SweepTarget::Path(path.into()),
            interval,
        }
    }

    /// Sweep once at the current time. Returns the number of records removed.
    pub fn sweep_once(&self) -> StateResult<usize> {
        let now = Utc::now().timestamp();
        let removed = match &self.target {
            SweepTarget::Shared(state) => state.sweep_expired(now)?,
            SweepTarget::Path(path) => StateStore::open(path)?.sweep_expired(now)?,
        };
        let total: usize = removed.values().sum();
        debug!(total, "expiry sweep finished");
        Ok(total)
    }

    /// Sweep every `interval` until `shutdown` changes. Failed sweeps are
    /// logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = self.interval.as_secs(), "expiry sweeper started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    if let Err(e) = self.sweep_once() {
                        error!(error = %e, "expiry sweep failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!("expiry sweeper shutting down");
                    break;
                }
            }
        }
    }
}
