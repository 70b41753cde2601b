//! Entity store - authoritative component values plus override layering

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::trace;

use orrery_core::{ComponentKind, ComponentValue, EntityId};

use crate::OverrideGuard;

/// Store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no {kind:?} component for entity {entity}")]
    Missing {
        entity: EntityId,
        kind: ComponentKind,
    },
}

/// Token naming one override; fresh per `push_override` call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct OverrideToken(pub(crate) u64);

#[derive(Clone, Debug)]
struct OverrideEntry {
    entity: EntityId,
    value: ComponentValue,
    /// Layering order; the newest entry for a pair shadows older ones
    seq: u64,
}

#[derive(Default)]
struct StoreInner {
    authoritative: HashMap<(EntityId, ComponentKind), ComponentValue>,
    overrides: HashMap<OverrideToken, OverrideEntry>,
    next_seq: u64,
}

/// The local reality: remote entity state mirrored by the sync loop, with
/// transient optimistic overrides layered on top.
///
/// Shared as `Arc<EntityStore>`. Overrides are token-scoped, never
/// entity-scoped: concurrent actions each remove only their own token, so
/// one action's cleanup cannot erase another's in-flight override.
#[derive(Default)]
pub struct EntityStore {
    inner: RwLock<StoreInner>,
    next_token: AtomicU64,
    revision: AtomicU64,
}

impl EntityStore {
    pub fn new() -> Self {
        EntityStore::default()
    }

    /// Read a component, with the newest override shadowing the
    /// authoritative value
    pub fn get(&self, entity: EntityId, kind: ComponentKind) -> Option<ComponentValue> {
        let inner = self.inner.read();
        inner
            .overrides
            .values()
            .filter(|e| e.entity == entity && e.value.kind() == kind)
            .max_by_key(|e| e.seq)
            .map(|e| e.value.clone())
            .or_else(|| inner.authoritative.get(&(entity, kind)).cloned())
    }

    /// Like `get`, but an absent component is an error
    pub fn get_strict(
        &self,
        entity: EntityId,
        kind: ComponentKind,
    ) -> Result<ComponentValue, StoreError> {
        self.get(entity, kind)
            .ok_or(StoreError::Missing { entity, kind })
    }

    /// Read the authoritative value only, ignoring overrides
    pub fn authoritative(&self, entity: EntityId, kind: ComponentKind) -> Option<ComponentValue> {
        self.inner.read().authoritative.get(&(entity, kind)).cloned()
    }

    /// Write an authoritative value from the sync stream.
    ///
    /// Overwrites any prior authoritative value for the pair; overrides are
    /// untouched and keep shadowing until released.
    pub fn apply_authoritative(&self, entity: EntityId, value: ComponentValue) {
        let kind = value.kind();
        self.inner.write().authoritative.insert((entity, kind), value);
        self.bump();
        trace!(%entity, ?kind, "authoritative value applied");
    }

    /// Layer an optimistic override above the authoritative value.
    ///
    /// Returns a guard that removes the override exactly once - explicitly
    /// via `release`, or on drop if the holder bails out early.
    pub fn push_override(
        self: &Arc<Self>,
        entity: EntityId,
        value: ComponentValue,
    ) -> OverrideGuard {
        let token = OverrideToken(self.next_token.fetch_add(1, Ordering::Relaxed));
        {
            let mut inner = self.inner.write();
            let seq = inner.next_seq;
            inner.next_seq += 1;
            inner.overrides.insert(token, OverrideEntry { entity, value, seq });
        }
        self.bump();
        trace!(%entity, ?token, "override applied");
        OverrideGuard::new(Arc::clone(self), token)
    }

    /// Remove an override by token. Idempotent; returns whether the token
    /// was still present. Only the guard calls this.
    pub(crate) fn remove_override(&self, token: OverrideToken) -> bool {
        let removed = self.inner.write().overrides.remove(&token).is_some();
        if removed {
            self.bump();
            trace!(?token, "override removed");
        }
        removed
    }

    /// All entities carrying a component of `kind`, override-layered,
    /// sorted by entity id
    pub fn entities_with(&self, kind: ComponentKind) -> Vec<(EntityId, ComponentValue)> {
        let inner = self.inner.read();
        let mut merged: BTreeMap<EntityId, (ComponentValue, Option<u64>)> = BTreeMap::new();

        for ((entity, k), value) in &inner.authoritative {
            if *k == kind {
                merged.insert(*entity, (value.clone(), None));
            }
        }
        for entry in inner.overrides.values() {
            if entry.value.kind() != kind {
                continue;
            }
            match merged.get(&entry.entity) {
                Some((_, Some(seq))) if *seq >= entry.seq => {}
                _ => {
                    merged.insert(entry.entity, (entry.value.clone(), Some(entry.seq)));
                }
            }
        }

        merged
            .into_iter()
            .map(|(entity, (value, _))| (entity, value))
            .collect()
    }

    /// Count of live overrides (diagnostics and tests)
    pub fn override_count(&self) -> usize {
        self.inner.read().overrides.len()
    }

    /// Store-wide change counter; bumped on every visible mutation so
    /// frame-rate readers can skip unchanged frames
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.revision.fetch_add(1, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::Position;

    fn pos(x: u32, y: u32) -> ComponentValue {
        ComponentValue::Position(Position::new(x, y))
    }

    #[test]
    fn test_authoritative_read_write() {
        let store = EntityStore::new();
        let entity = EntityId::from_index(1);

        assert_eq!(store.get(entity, ComponentKind::Position), None);
        store.apply_authoritative(entity, pos(3, 4));
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(3, 4)));

        store.apply_authoritative(entity, pos(3, 5));
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(3, 5)));
    }

    #[test]
    fn test_get_strict_missing() {
        let store = EntityStore::new();
        let entity = EntityId::from_index(1);
        assert_eq!(
            store.get_strict(entity, ComponentKind::Position),
            Err(StoreError::Missing {
                entity,
                kind: ComponentKind::Position
            })
        );
    }

    #[test]
    fn test_override_shadows_authoritative() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);
        store.apply_authoritative(entity, pos(5, 5));

        let guard = store.push_override(entity, pos(5, 4));
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(5, 4)));
        assert_eq!(
            store.authoritative(entity, ComponentKind::Position),
            Some(pos(5, 5))
        );

        guard.release();
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(5, 5)));
    }

    #[test]
    fn test_sync_write_does_not_disturb_override() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);
        let guard = store.push_override(entity, pos(9, 9));

        store.apply_authoritative(entity, pos(1, 1));
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(9, 9)));

        guard.release();
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(1, 1)));
    }

    #[test]
    fn test_newest_override_wins() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);

        let first = store.push_override(entity, pos(1, 0));
        let second = store.push_override(entity, pos(2, 0));
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(2, 0)));

        // Releasing the newer override exposes the older one, not the
        // authoritative gap.
        second.release();
        assert_eq!(store.get(entity, ComponentKind::Position), Some(pos(1, 0)));
        first.release();
        assert_eq!(store.get(entity, ComponentKind::Position), None);
    }

    #[test]
    fn test_overrides_independent_across_entities() {
        let store = Arc::new(EntityStore::new());
        let a = EntityId::from_index(1);
        let b = EntityId::from_index(2);

        let guard_a = store.push_override(a, pos(1, 1));
        let guard_b = store.push_override(b, pos(2, 2));

        guard_a.release();
        assert_eq!(store.get(b, ComponentKind::Position), Some(pos(2, 2)));
        guard_b.release();
        assert_eq!(store.override_count(), 0);
    }

    #[test]
    fn test_entities_with_merges_override_only_entities() {
        let store = Arc::new(EntityStore::new());
        let synced = EntityId::from_index(1);
        let optimistic = EntityId::from_index(2);
        store.apply_authoritative(synced, pos(1, 1));
        let guard = store.push_override(optimistic, pos(7, 7));

        let listed = store.entities_with(ComponentKind::Position);
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|(e, v)| *e == synced && *v == pos(1, 1)));
        assert!(listed
            .iter()
            .any(|(e, v)| *e == optimistic && *v == pos(7, 7)));

        // Sorted by entity id
        assert!(listed.windows(2).all(|w| w[0].0 < w[1].0));
        guard.release();
    }

    #[test]
    fn test_revision_bumps_on_changes() {
        let store = Arc::new(EntityStore::new());
        let entity = EntityId::from_index(1);
        let r0 = store.revision();

        store.apply_authoritative(entity, pos(1, 1));
        let r1 = store.revision();
        assert!(r1 > r0);

        let guard = store.push_override(entity, pos(2, 2));
        let r2 = store.revision();
        assert!(r2 > r1);

        guard.release();
        assert!(store.revision() > r2);
    }
}
