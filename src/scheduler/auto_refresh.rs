//! Auto-refresh scheduler for the chart listing
//!
//! The server moves records from `wait` through `running` on its own. When
//! enabled, this re-fetches the current listing page on a fixed interval, but
//! only while that page still shows records in a pending state. It never
//! changes the search parameters.

use crate::services::ListingService;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Periodic listing refresher
pub struct AutoRefreshScheduler {
    listing: Arc<ListingService>,
    interval: Duration,
}

impl AutoRefreshScheduler {
    pub fn new(listing: Arc<ListingService>, interval: Duration) -> Self {
        Self { listing, interval }
    }

    /// Spawn the refresh loop
    ///
    /// The first check happens one interval after start.
    pub fn start(self) -> AutoRefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        info!("Auto-refresh started, every {:?}", self.interval);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(
                tokio::time::Instant::now() + self.interval,
                self.interval,
            );
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        info!("Auto-refresh stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if self.listing.has_pending_jobs() {
                            debug!("Pending jobs on page, refreshing");
                            self.listing.refresh().await;
                        }
                    }
                }
            }
        });

        AutoRefreshHandle {
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

/// Stops the refresh loop when told to, or when dropped
pub struct AutoRefreshHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl AutoRefreshHandle {
    /// Signal the loop to stop
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Stop and wait for the loop to finish
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for AutoRefreshHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
