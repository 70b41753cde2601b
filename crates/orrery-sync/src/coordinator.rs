//! The background sync loop
//!
//! `SyncCoordinator::spawn` issues the subscription plan to the chain
//! client and keeps the entity store current for the lifetime of the
//! process. Stream failures never escape the task: the loop logs, reports
//! `Reconnecting` on the health channel, backs off, and tries again.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use orrery_chain::{ChainClient, FeedEvent, SubscriptionRequest};
use orrery_core::Address;
use orrery_store::EntityStore;

use crate::{subscription_plan, ConfirmationTracker, SyncConfig};

/// Health of the sync stream, published for the host UI
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncHealth {
    /// First connection not yet established
    Connecting,
    /// Feed open, updates flowing
    Connected,
    /// Feed lost; backing off before retry `attempt`
    Reconnecting { attempt: u32 },
    /// Coordinator shut down by the host
    Stopped,
}

/// Counters for the sync loop
#[derive(Default)]
pub struct SyncStats {
    pub(crate) updates_applied: AtomicU64,
    pub(crate) confirmations: AtomicU64,
    pub(crate) reconnects: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncStatsSnapshot {
    pub updates_applied: u64,
    pub confirmations: u64,
    pub reconnects: u64,
}

impl SyncStats {
    pub fn snapshot(&self) -> SyncStatsSnapshot {
        SyncStatsSnapshot {
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
            confirmations: self.confirmations.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}

/// Handle to a running sync loop
pub struct SyncHandle {
    health_tx: Arc<watch::Sender<SyncHealth>>,
    health_rx: watch::Receiver<SyncHealth>,
    confirmations: ConfirmationTracker,
    stats: Arc<SyncStats>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Current stream health
    pub fn health(&self) -> SyncHealth {
        *self.health_rx.borrow()
    }

    /// Subscribe to health changes
    pub fn watch_health(&self) -> watch::Receiver<SyncHealth> {
        self.health_rx.clone()
    }

    /// The confirmation registry fed by this loop
    pub fn confirmations(&self) -> ConfirmationTracker {
        self.confirmations.clone()
    }

    pub fn stats(&self) -> SyncStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop the loop and mark the stream stopped
    pub fn shutdown(self) {
        self.task.abort();
        self.health_tx.send_replace(SyncHealth::Stopped);
    }
}

/// Bootstraps and owns the continuous synchronization process
pub struct SyncCoordinator;

impl SyncCoordinator {
    /// Spawn the sync loop for `local`'s view of the world.
    ///
    /// Does not block; synchronization runs concurrently until `shutdown`.
    /// Must be called from within a tokio runtime.
    pub fn spawn<C: ChainClient>(
        store: Arc<EntityStore>,
        client: Arc<C>,
        config: SyncConfig,
        local: Address,
    ) -> SyncHandle {
        let plan = subscription_plan(&config, local);
        let (health_tx, health_rx) = watch::channel(SyncHealth::Connecting);
        let health_tx = Arc::new(health_tx);
        let confirmations = ConfirmationTracker::default();
        let stats = Arc::new(SyncStats::default());

        let task = tokio::spawn(run_sync_loop(
            store,
            client,
            config,
            plan,
            Arc::clone(&health_tx),
            confirmations.clone(),
            Arc::clone(&stats),
        ));

        SyncHandle {
            health_tx,
            health_rx,
            confirmations,
            stats,
            task,
        }
    }
}

async fn run_sync_loop<C: ChainClient>(
    store: Arc<EntityStore>,
    client: Arc<C>,
    config: SyncConfig,
    plan: Vec<SubscriptionRequest>,
    health: Arc<watch::Sender<SyncHealth>>,
    confirmations: ConfirmationTracker,
    stats: Arc<SyncStats>,
) {
    let mut attempt: u32 = 0;

    loop {
        match client.open_feed(&plan).await {
            Ok(mut feed) => {
                attempt = 0;
                health.send_replace(SyncHealth::Connected);
                info!(subscriptions = plan.len(), "state feed open");

                while let Some(event) = feed.recv().await {
                    match event {
                        FeedEvent::Update(update) => {
                            store.apply_authoritative(update.entity, update.value);
                            stats.updates_applied.fetch_add(1, Ordering::Relaxed);
                        }
                        FeedEvent::Confirmed(tx) => {
                            debug!(%tx, "transaction indexed");
                            confirmations.confirm(tx);
                            stats.confirmations.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                }
                warn!("state feed closed");
            }
            Err(err) => {
                warn!(error = %err, "failed to open state feed");
            }
        }

        let delay = config.reconnect.delay(attempt);
        attempt = attempt.saturating_add(1);
        stats.reconnects.fetch_add(1, Ordering::Relaxed);
        health.send_replace(SyncHealth::Reconnecting { attempt });
        debug!(attempt, ?delay, "reconnecting after backoff");
        tokio::time::sleep(delay).await;
    }
}
