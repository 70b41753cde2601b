//! Sync configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use orrery_chain::Backoff;

/// Configuration for the sync coordinator and action submission.
///
/// The entity index bound is the known limitation of the current protocol:
/// records are fetched by enumerating player indices, so entities past the
/// bound are invisible until the remote side grows a broadcast
/// subscription. It is configuration here, never a hard-coded constant.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Highest player index to subscribe (inclusive; indices start at 1)
    pub entity_index_bound: u32,
    /// Contract the game's actions live on
    pub contract: String,
    /// How long to wait for indexer confirmation of a submitted action
    pub confirmation_timeout: Duration,
    /// Fallback wait when the client cannot signal confirmation at all
    pub indexer_delay: Duration,
    /// Reconnect policy for the sync stream
    pub reconnect: Backoff,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            entity_index_bound: 20,
            contract: "actions".to_string(),
            confirmation_timeout: Duration::from_secs(5),
            indexer_delay: Duration::from_secs(1),
            reconnect: Backoff::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.entity_index_bound, 20);
        assert_eq!(config.contract, "actions");
        assert!(config.confirmation_timeout > config.indexer_delay);
    }
}
