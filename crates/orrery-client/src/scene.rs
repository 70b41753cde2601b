//! Scene projection - store state to pixel placements
//!
//! The rendering engine reads the store once per frame through a
//! `SceneProjector`. Grid coordinates are origin-offset adjusted and
//! scaled to tile size; the sprite owned by the local account is flagged
//! so the camera can follow it.

use std::collections::HashMap;
use std::sync::Arc;

use orrery_core::{Address, ComponentKind, EntityId, Position};
use orrery_store::EntityStore;

use crate::ClientConfig;

/// Pixel-space placement of a sprite
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelPosition {
    pub x: u32,
    pub y: u32,
}

/// One sprite placement for the current frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteUpdate {
    pub entity: EntityId,
    pub pixel: PixelPosition,
    /// The local player's pawn; center the camera here
    pub follow: bool,
}

/// Per-frame reader of the entity store
pub struct SceneProjector {
    store: Arc<EntityStore>,
    local: Address,
    tile_width: u32,
    tile_height: u32,
    origin_offset: u32,
    /// Entity -> owning address, filled lazily as PlayerAddress syncs
    addresses: HashMap<EntityId, Address>,
    last_revision: Option<u64>,
}

impl SceneProjector {
    pub fn new(store: Arc<EntityStore>, config: &ClientConfig, local: Address) -> Self {
        SceneProjector {
            store,
            local,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            origin_offset: config.origin_offset,
            addresses: HashMap::new(),
            last_revision: None,
        }
    }

    /// Placements for every positioned entity, sorted by entity id.
    ///
    /// Returns `None` when the store has not changed since the last frame.
    pub fn frame(&mut self) -> Option<Vec<SpriteUpdate>> {
        let revision = self.store.revision();
        if self.last_revision == Some(revision) {
            return None;
        }
        self.last_revision = Some(revision);

        let positioned = self.store.entities_with(ComponentKind::Position);
        let mut updates = Vec::with_capacity(positioned.len());

        for (entity, value) in positioned {
            let Some(position) = value.as_position() else {
                continue;
            };
            let follow = self.owner(entity) == Some(self.local);
            updates.push(SpriteUpdate {
                entity,
                pixel: self.project(position),
                follow,
            });
        }

        Some(updates)
    }

    /// Grid position to pixel placement
    fn project(&self, position: Position) -> PixelPosition {
        PixelPosition {
            x: position.x.saturating_sub(self.origin_offset) * self.tile_width,
            y: position.y.saturating_sub(self.origin_offset) * self.tile_height,
        }
    }

    /// Owning address for an entity, cached once the PlayerAddress
    /// component has synced
    fn owner(&mut self, entity: EntityId) -> Option<Address> {
        if let Some(address) = self.addresses.get(&entity) {
            return Some(*address);
        }
        let address = self
            .store
            .get(entity, ComponentKind::PlayerAddress)?
            .as_player_address()?;
        self.addresses.insert(entity, address);
        Some(address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::ComponentValue;

    fn projector(store: &Arc<EntityStore>, local: Address) -> SceneProjector {
        SceneProjector::new(Arc::clone(store), &ClientConfig::default(), local)
    }

    #[test]
    fn test_projection_offsets_and_scales() {
        let store = Arc::new(EntityStore::new());
        let local = Address::new(0xAA);
        let entity = EntityId::from_index(1);
        store.apply_authoritative(entity, ComponentValue::Position(Position::new(105, 102)));

        let mut scene = projector(&store, local);
        let updates = scene.frame().expect("first frame renders");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].pixel, PixelPosition { x: 5 * 32, y: 2 * 32 });
    }

    #[test]
    fn test_positions_below_offset_clamp_to_zero() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);
        store.apply_authoritative(entity, ComponentValue::Position(Position::new(3, 3)));

        let mut scene = projector(&store, Address::new(0xAA));
        let updates = scene.frame().unwrap();
        assert_eq!(updates[0].pixel, PixelPosition { x: 0, y: 0 });
    }

    #[test]
    fn test_local_pawn_is_followed() {
        let store = Arc::new(EntityStore::new());
        let local = Address::new(0xAA);
        let mine = EntityId::from_index(1);
        let theirs = EntityId::from_index(2);

        store.apply_authoritative(mine, ComponentValue::Position(Position::new(101, 101)));
        store.apply_authoritative(mine, ComponentValue::PlayerAddress { player: local });
        store.apply_authoritative(theirs, ComponentValue::Position(Position::new(102, 102)));
        store.apply_authoritative(
            theirs,
            ComponentValue::PlayerAddress {
                player: Address::new(0xBB),
            },
        );

        let mut scene = projector(&store, local);
        let updates = scene.frame().unwrap();
        assert_eq!(updates.len(), 2);
        for update in updates {
            assert_eq!(update.follow, update.entity == mine);
        }
    }

    #[test]
    fn test_unchanged_store_skips_frame() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);
        store.apply_authoritative(entity, ComponentValue::Position(Position::new(101, 101)));

        let mut scene = projector(&store, Address::new(0xAA));
        assert!(scene.frame().is_some());
        assert!(scene.frame().is_none());

        store.apply_authoritative(entity, ComponentValue::Position(Position::new(101, 102)));
        assert!(scene.frame().is_some());
    }

    #[test]
    fn test_address_cache_fills_once_synced() {
        let store = Arc::new(EntityStore::new());
        let local = Address::new(0xAA);
        let entity = EntityId::from_index(1);
        store.apply_authoritative(entity, ComponentValue::Position(Position::new(101, 101)));

        let mut scene = projector(&store, local);
        // Address not yet synced: not followed, not cached.
        assert!(!scene.frame().unwrap()[0].follow);

        store.apply_authoritative(entity, ComponentValue::PlayerAddress { player: local });
        assert!(scene.frame().unwrap()[0].follow);
    }
}
