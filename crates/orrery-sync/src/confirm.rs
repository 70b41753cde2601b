//! Transaction confirmation tracking
//!
//! The sync loop reports indexed transactions here; action submitters wait
//! on them with a bounded timeout. A confirmation that lands before the
//! wait starts still resolves immediately - the tracker remembers recent
//! transaction ids, so there is no lost-wakeup race.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::oneshot;

use orrery_core::TransactionId;

/// Outcome of waiting for a confirmation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfirmationStatus {
    Confirmed,
    TimedOut,
}

struct TrackerInner {
    /// Recently confirmed ids, oldest first (for eviction)
    remembered: VecDeque<TransactionId>,
    confirmed: HashSet<TransactionId>,
    waiters: HashMap<TransactionId, Vec<oneshot::Sender<()>>>,
    capacity: usize,
}

/// Shared confirmation registry; cheap to clone
#[derive(Clone)]
pub struct ConfirmationTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl ConfirmationTracker {
    /// `capacity` bounds how many confirmed ids are remembered
    pub fn new(capacity: usize) -> Self {
        ConfirmationTracker {
            inner: Arc::new(Mutex::new(TrackerInner {
                remembered: VecDeque::new(),
                confirmed: HashSet::new(),
                waiters: HashMap::new(),
                capacity,
            })),
        }
    }

    /// Record a confirmed transaction and wake anyone waiting on it.
    /// Idempotent.
    pub fn confirm(&self, tx: TransactionId) {
        let woken = {
            let mut inner = self.inner.lock();
            if !inner.confirmed.insert(tx) {
                return;
            }
            inner.remembered.push_back(tx);
            while inner.remembered.len() > inner.capacity {
                if let Some(evicted) = inner.remembered.pop_front() {
                    inner.confirmed.remove(&evicted);
                }
            }
            inner.waiters.remove(&tx)
        };

        for waiter in woken.into_iter().flatten() {
            let _ = waiter.send(());
        }
    }

    /// Whether a transaction is already known confirmed
    pub fn is_confirmed(&self, tx: TransactionId) -> bool {
        self.inner.lock().confirmed.contains(&tx)
    }

    /// Wait until `tx` is confirmed or the timeout elapses
    pub async fn wait_for(&self, tx: TransactionId, timeout: Duration) -> ConfirmationStatus {
        let rx = {
            let mut inner = self.inner.lock();
            if inner.confirmed.contains(&tx) {
                return ConfirmationStatus::Confirmed;
            }
            // Waiters abandoned by earlier timeouts are pruned as we go.
            inner.waiters.retain(|_, senders| {
                senders.retain(|s| !s.is_closed());
                !senders.is_empty()
            });
            let (notify, rx) = oneshot::channel();
            inner.waiters.entry(tx).or_default().push(notify);
            rx
        };

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(())) => ConfirmationStatus::Confirmed,
            _ => ConfirmationStatus::TimedOut,
        }
    }
}

impl Default for ConfirmationTracker {
    fn default() -> Self {
        ConfirmationTracker::new(1024)
    }
}
