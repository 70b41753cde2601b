//! Action submission
//!
//! A move runs through a fixed lifecycle: resolve the caller's pawn and
//! position, predict the destination, layer a position override, submit
//! the transaction, wait for the indexer, release the override. The
//! override guard ties release to scope exit, so the cleanup half of the
//! lifecycle holds on the error path, on timeout, and when the caller
//! drops the future mid-flight.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use orrery_chain::{ChainClient, ChainError, Signer, TransactionHandle};
use orrery_core::{
    Address, ComponentKind, ComponentValue, Direction, EntityId, Position, TransactionId,
};
use orrery_store::EntityStore;
use orrery_sync::{ConfirmationStatus, ConfirmationTracker, SyncConfig};

/// Action name for joining the game
pub const ACTION_SPAWN: &str = "spawn";
/// Action name for moving the pawn
pub const ACTION_MOVE: &str = "move";

/// Typed failure of an action attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The chain client failed to submit (transport or contract rejection)
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// The local account has no player id synced yet
    #[error("no player id synced for {address}")]
    UnknownPlayer { address: Address },

    /// Submission succeeded but the indexer never confirmed in time; local
    /// state has been rolled back to the last authoritative value
    #[error("transaction {tx} not indexed within {timeout:?}")]
    ConfirmationTimeout {
        tx: TransactionId,
        timeout: Duration,
    },
}

/// Successful move: the submitted transaction and the position it predicted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub transaction: TransactionHandle,
    pub position: Position,
}

/// Submits player actions against the game contract
pub struct ActionSubmitter<C> {
    store: Arc<EntityStore>,
    client: Arc<C>,
    confirmations: ConfirmationTracker,
    config: SyncConfig,
}

impl<C: ChainClient> ActionSubmitter<C> {
    pub fn new(
        store: Arc<EntityStore>,
        client: Arc<C>,
        confirmations: ConfirmationTracker,
        config: SyncConfig,
    ) -> Self {
        ActionSubmitter {
            store,
            client,
            confirmations,
            config,
        }
    }

    /// Join the game. No optimistic state; the spawned pawn appears once
    /// the sync stream delivers it.
    pub async fn spawn(&self, signer: &Signer) -> Result<TransactionHandle, ActionError> {
        let tx = self
            .client
            .execute(signer, &self.config.contract, ACTION_SPAWN, &[])
            .await
            .map_err(|err| {
                warn!(error = %err, "spawn submission failed");
                err
            })?;

        debug!(tx = %tx.id, "spawn submitted");
        Ok(tx)
    }

    /// Move the caller's pawn one tile.
    ///
    /// The predicted position is visible to store readers immediately and
    /// until resolution: confirmed moves hand back to the authoritative
    /// value the indexer produces, failed and timed-out moves roll back to
    /// the last authoritative value.
    pub async fn move_player(
        &self,
        signer: &Signer,
        direction: Direction,
    ) -> Result<MoveOutcome, ActionError> {
        let pawn = self.resolve_pawn(signer.address)?;
        let current = self.current_position(pawn);
        let target = direction.apply(current);

        let guard = self
            .store
            .push_override(pawn, ComponentValue::Position(target));

        // An early return drops the guard and rolls the override back.
        let tx = self
            .client
            .execute(
                signer,
                &self.config.contract,
                ACTION_MOVE,
                &[direction.to_felt()],
            )
            .await
            .map_err(|err| {
                warn!(error = %err, %pawn, "move submission failed");
                err
            })?;

        debug!(tx = %tx.id, %pawn, ?direction, "move submitted");

        let status = if self.client.supports_confirmation() {
            self.confirmations
                .wait_for(tx.id, self.config.confirmation_timeout)
                .await
        } else {
            // No confirmation signal from this client; approximate indexer
            // catch-up with the configured fixed delay.
            tokio::time::sleep(self.config.indexer_delay).await;
            ConfirmationStatus::Confirmed
        };

        guard.release();

        match status {
            ConfirmationStatus::Confirmed => Ok(MoveOutcome {
                transaction: tx,
                position: target,
            }),
            ConfirmationStatus::TimedOut => {
                warn!(tx = %tx.id, "move confirmation timed out");
                Err(ActionError::ConfirmationTimeout {
                    tx: tx.id,
                    timeout: self.config.confirmation_timeout,
                })
            }
        }
    }

    /// Address -> identity entity -> player id -> pawn entity
    fn resolve_pawn(&self, address: Address) -> Result<EntityId, ActionError> {
        let identity = EntityId::from_address(address);
        let id = self
            .store
            .get(identity, ComponentKind::PlayerId)
            .and_then(|value| value.as_player_id())
            .ok_or(ActionError::UnknownPlayer { address })?;
        Ok(EntityId::from_index(id))
    }

    /// Current pawn position; origin when nothing has synced yet
    fn current_position(&self, pawn: EntityId) -> Position {
        match self
            .store
            .get(pawn, ComponentKind::Position)
            .and_then(|value| value.as_position())
        {
            Some(position) => position,
            None => {
                warn!(%pawn, "no position synced for pawn, assuming origin");
                Position::ORIGIN
            }
        }
    }
}
