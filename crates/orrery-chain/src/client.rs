//! The remote state client interface
//!
//! A `ChainClient` does two things: it keeps a live feed of entity updates
//! for a set of (model, keys) subscriptions, and it executes named actions
//! against a named contract. Everything wire-level lives behind this trait.

use std::future::Future;

use tokio::sync::mpsc;

use orrery_core::{Address, ComponentKind, ComponentValue, EntityId, TransactionId};

use crate::ChainResult;

/// One (model, keys) record the client wants kept live
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubscriptionRequest {
    pub kind: ComponentKind,
    pub keys: Vec<u64>,
}

impl SubscriptionRequest {
    pub fn new(kind: ComponentKind, keys: Vec<u64>) -> Self {
        SubscriptionRequest { kind, keys }
    }

    /// The entity these keys resolve to
    pub fn entity(&self) -> EntityId {
        EntityId::from_keys(&self.keys)
    }
}

/// A fresh authoritative value for one entity component
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityUpdate {
    pub entity: EntityId,
    pub value: ComponentValue,
}

/// Events delivered on the sync feed.
///
/// The feed channel closing (sender dropped) signals stream failure; the
/// sync loop reconnects, it does not see an event for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedEvent {
    /// An authoritative component value changed
    Update(EntityUpdate),
    /// A submitted transaction has been indexed
    Confirmed(TransactionId),
}

/// Receiving half of a live sync feed
pub type FeedReceiver = mpsc::Receiver<FeedEvent>;

/// Result of submitting an action
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionHandle {
    pub id: TransactionId,
}

/// Credential object authorizing submission on behalf of a player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signer {
    pub address: Address,
}

impl Signer {
    pub fn new(address: Address) -> Self {
        Signer { address }
    }
}

/// Felt-shaped calldata word
pub type CallArg = u64;

/// The remote state client.
///
/// Implementations must be cheap to share (`Arc`) and their futures `Send`;
/// the sync loop runs them from a spawned task.
pub trait ChainClient: Send + Sync + 'static {
    /// Establish live synchronization for the given subscriptions.
    ///
    /// Updates flow on the returned channel until the underlying stream
    /// fails, at which point the channel closes.
    fn open_feed(
        &self,
        subscriptions: &[SubscriptionRequest],
    ) -> impl Future<Output = ChainResult<FeedReceiver>> + Send;

    /// Execute a named action against a named contract
    fn execute(
        &self,
        signer: &Signer,
        contract: &str,
        action: &str,
        calldata: &[CallArg],
    ) -> impl Future<Output = ChainResult<TransactionHandle>> + Send;

    /// Whether the feed emits `FeedEvent::Confirmed` for submitted
    /// transactions. Clients without indexer confirmation force callers
    /// onto a fixed-delay fallback.
    fn supports_confirmation(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_entity_matches_key_derivation() {
        let sub = SubscriptionRequest::new(ComponentKind::Position, vec![7]);
        assert_eq!(sub.entity(), EntityId::from_keys(&[7]));
    }
}
