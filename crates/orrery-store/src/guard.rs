//! Scoped release of optimistic overrides

use std::sync::Arc;

use tracing::warn;

use crate::{EntityStore, OverrideToken};

/// Handle to one pushed override.
///
/// The override is removed exactly once per guard: explicitly through
/// `release`, or on drop for every early-exit path (submission error,
/// timeout, the holding future being cancelled). The token is consumed by
/// whichever happens first, so a second removal cannot occur.
#[must_use = "dropping the guard immediately would roll the override back"]
pub struct OverrideGuard {
    store: Arc<EntityStore>,
    token: Option<OverrideToken>,
}

impl OverrideGuard {
    pub(crate) fn new(store: Arc<EntityStore>, token: OverrideToken) -> Self {
        OverrideGuard {
            store,
            token: Some(token),
        }
    }

    /// The token this guard owns
    pub fn token(&self) -> OverrideToken {
        self.token.expect("guard token taken before release")
    }

    /// Remove the override now instead of at scope exit
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if let Some(token) = self.token.take() {
            if !self.store.remove_override(token) {
                // Unreachable through the public API; tokens are private to
                // the guard that owns them.
                warn!(?token, "override token already removed");
            }
        }
    }
}

impl Drop for OverrideGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}
