//! Client bootstrap

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use orrery_actions::ActionSubmitter;
use orrery_chain::ChainClient;
use orrery_core::Address;
use orrery_store::EntityStore;
use orrery_sync::{SyncConfig, SyncCoordinator, SyncHandle, SyncHealth, SyncStatsSnapshot};

use crate::SceneProjector;

/// Host-facing client configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub sync: SyncConfig,
    /// Tile size in pixels
    pub tile_width: u32,
    pub tile_height: u32,
    /// Contract-side coordinate offset; the playfield starts here so
    /// unsigned coordinates never underflow
    pub origin_offset: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            sync: SyncConfig::default(),
            tile_width: 32,
            tile_height: 32,
            origin_offset: 100,
        }
    }
}

impl ClientConfig {
    /// Parse a config from JSON; absent fields take defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// A connected game client.
///
/// Owns the shared entity store, the running sync loop, and the action
/// submitter. Every collaborator is passed in by reference or ownership;
/// there are no implicit singletons.
pub struct GameClient<C: ChainClient> {
    store: Arc<EntityStore>,
    actions: ActionSubmitter<C>,
    sync: SyncHandle,
    config: ClientConfig,
    local: Address,
}

impl<C: ChainClient> GameClient<C> {
    /// Build the store, start synchronization, and wire up action
    /// submission for the local account.
    ///
    /// Must be called from within a tokio runtime; the sync loop runs
    /// until `shutdown`.
    pub fn connect(config: ClientConfig, client: Arc<C>, local: Address) -> Self {
        let store = Arc::new(EntityStore::new());
        let sync = SyncCoordinator::spawn(
            Arc::clone(&store),
            Arc::clone(&client),
            config.sync.clone(),
            local,
        );
        let actions = ActionSubmitter::new(
            Arc::clone(&store),
            client,
            sync.confirmations(),
            config.sync.clone(),
        );

        info!(%local, bound = config.sync.entity_index_bound, "game client connected");

        GameClient {
            store,
            actions,
            sync,
            config,
            local,
        }
    }

    /// The shared entity store (scene readers hold a clone of this)
    pub fn store(&self) -> &Arc<EntityStore> {
        &self.store
    }

    /// Action submission for UI triggers
    pub fn actions(&self) -> &ActionSubmitter<C> {
        &self.actions
    }

    /// Current sync stream health
    pub fn health(&self) -> SyncHealth {
        self.sync.health()
    }

    /// Subscribe to sync health changes
    pub fn watch_health(&self) -> watch::Receiver<SyncHealth> {
        self.sync.watch_health()
    }

    pub fn sync_stats(&self) -> SyncStatsSnapshot {
        self.sync.stats()
    }

    pub fn local_address(&self) -> Address {
        self.local
    }

    /// A scene projector reading this client's store
    pub fn projector(&self) -> SceneProjector {
        SceneProjector::new(Arc::clone(&self.store), &self.config, self.local)
    }

    /// Stop the sync loop and drop the client
    pub fn shutdown(self) {
        self.sync.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.tile_width, 32);
        assert_eq!(config.tile_height, 32);
        assert_eq!(config.origin_offset, 100);
    }

    #[test]
    fn test_config_from_json_partial() {
        let config = ClientConfig::from_json(r#"{ "tile_width": 16 }"#).unwrap();
        assert_eq!(config.tile_width, 16);
        assert_eq!(config.tile_height, 32);
        assert_eq!(config.sync.entity_index_bound, 20);
    }
}
