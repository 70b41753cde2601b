//! Scripted in-memory chain client
//!
//! Plays the role of the remote state client in tests: updates are pushed
//! by the test script, executions are recorded for assertions, and faults
//! (failed opens, transport errors, rejections) are injected on demand.
//! Events pushed while no feed is open are buffered and flushed on the
//! next `open_feed`, which makes reconnect tests deterministic.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use orrery_chain::{
    CallArg, ChainClient, ChainError, ChainResult, EntityUpdate, FeedEvent, FeedReceiver, Signer,
    SubscriptionRequest, TransactionHandle,
};
use orrery_core::{Address, ComponentValue, EntityId, TransactionId};

const FEED_CAPACITY: usize = 256;

/// One recorded `execute` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub signer: Address,
    pub contract: String,
    pub action: String,
    pub calldata: Vec<CallArg>,
}

#[derive(Clone, Copy, Debug)]
enum ExecuteFault {
    Transport,
    Rejected,
}

struct ChainState {
    feed: Option<mpsc::Sender<FeedEvent>>,
    pending: Vec<FeedEvent>,
    executions: Vec<ExecutionRecord>,
    subscriptions: Vec<SubscriptionRequest>,
    failed_opens_remaining: u32,
    next_execute_fault: Option<ExecuteFault>,
    auto_confirm: bool,
    confirmation_supported: bool,
    next_tx: u64,
}

/// In-memory `ChainClient` driven by the test script
pub struct ScriptedChain {
    inner: Arc<Mutex<ChainState>>,
}

impl ScriptedChain {
    /// Confirmation-capable client that confirms every execute through the
    /// feed, like an indexer that always catches up
    pub fn new() -> Self {
        Self::with_flags(true, true)
    }

    /// Confirmation-capable client that confirms only when the script
    /// calls `confirm`
    pub fn manual_confirmation() -> Self {
        Self::with_flags(false, true)
    }

    /// Client whose feed never carries confirmations; callers fall back to
    /// the fixed indexer delay
    pub fn without_confirmation() -> Self {
        Self::with_flags(false, false)
    }

    fn with_flags(auto_confirm: bool, confirmation_supported: bool) -> Self {
        ScriptedChain {
            inner: Arc::new(Mutex::new(ChainState {
                feed: None,
                pending: Vec::new(),
                executions: Vec::new(),
                subscriptions: Vec::new(),
                failed_opens_remaining: 0,
                next_execute_fault: None,
                auto_confirm,
                confirmation_supported,
                next_tx: 1,
            })),
        }
    }

    /// Make the next `n` `open_feed` calls fail with a transport error
    pub fn fail_opens(&self, n: u32) {
        self.inner.lock().failed_opens_remaining = n;
    }

    /// Make the next `execute` fail with a transport error
    pub fn fail_next_execute(&self) {
        self.inner.lock().next_execute_fault = Some(ExecuteFault::Transport);
    }

    /// Make the next `execute` fail with a contract rejection
    pub fn reject_next_execute(&self) {
        self.inner.lock().next_execute_fault = Some(ExecuteFault::Rejected);
    }

    /// Deliver an authoritative update (buffered if no feed is open)
    pub fn push_update(&self, entity: EntityId, value: ComponentValue) {
        self.deliver(FeedEvent::Update(EntityUpdate { entity, value }));
    }

    /// Deliver an update for the entity keyed by a player index
    pub fn push_indexed(&self, index: u32, value: ComponentValue) {
        self.push_update(EntityId::from_index(index), value);
    }

    /// Deliver a confirmation for a submitted transaction
    pub fn confirm(&self, tx: TransactionId) {
        self.deliver(FeedEvent::Confirmed(tx));
    }

    /// Close the live feed, as a dropped stream would
    pub fn drop_feed(&self) {
        self.inner.lock().feed = None;
    }

    /// Whether a feed is currently open
    pub fn feed_open(&self) -> bool {
        self.inner.lock().feed.is_some()
    }

    /// Every `execute` call recorded so far
    pub fn executions(&self) -> Vec<ExecutionRecord> {
        self.inner.lock().executions.clone()
    }

    /// The subscription set from the most recent `open_feed`
    pub fn subscriptions(&self) -> Vec<SubscriptionRequest> {
        self.inner.lock().subscriptions.clone()
    }

    fn deliver(&self, event: FeedEvent) {
        let mut state = self.inner.lock();
        let delivered = match &state.feed {
            Some(feed) => feed.try_send(event.clone()).is_ok(),
            None => false,
        };
        if !delivered {
            state.pending.push(event);
        }
    }
}

impl Default for ScriptedChain {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainClient for ScriptedChain {
    async fn open_feed(
        &self,
        subscriptions: &[SubscriptionRequest],
    ) -> ChainResult<FeedReceiver> {
        let mut state = self.inner.lock();
        state.subscriptions = subscriptions.to_vec();

        if state.failed_opens_remaining > 0 {
            state.failed_opens_remaining -= 1;
            return Err(ChainError::Transport("scripted feed failure".to_string()));
        }

        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        for event in state.pending.drain(..) {
            let _ = tx.try_send(event);
        }
        state.feed = Some(tx);
        Ok(rx)
    }

    async fn execute(
        &self,
        signer: &Signer,
        contract: &str,
        action: &str,
        calldata: &[CallArg],
    ) -> ChainResult<TransactionHandle> {
        let mut state = self.inner.lock();
        state.executions.push(ExecutionRecord {
            signer: signer.address,
            contract: contract.to_string(),
            action: action.to_string(),
            calldata: calldata.to_vec(),
        });

        if let Some(fault) = state.next_execute_fault.take() {
            return Err(match fault {
                ExecuteFault::Transport => {
                    ChainError::Transport("scripted transport failure".to_string())
                }
                ExecuteFault::Rejected => {
                    ChainError::Rejected("scripted rejection".to_string())
                }
            });
        }

        let tx = TransactionId::new(state.next_tx);
        state.next_tx += 1;

        if state.auto_confirm && state.confirmation_supported {
            let event = FeedEvent::Confirmed(tx);
            let delivered = match &state.feed {
                Some(feed) => feed.try_send(event.clone()).is_ok(),
                None => false,
            };
            if !delivered {
                state.pending.push(event);
            }
        }

        Ok(TransactionHandle { id: tx })
    }

    fn supports_confirmation(&self) -> bool {
        self.inner.lock().confirmation_supported
    }
}
