//! Subscription planning
//!
//! The plan is built once at startup: every tracked component for every
//! player index in `[1, bound]`, plus one identity-resolution entry that
//! maps the local account's address to its player id.

use orrery_chain::SubscriptionRequest;
use orrery_core::{Address, ComponentKind};

use crate::SyncConfig;

/// Build the initial subscription set.
///
/// Order is deterministic: indices ascending, kinds in `ComponentKind::ALL`
/// order within each index, the identity entry last.
pub fn subscription_plan(config: &SyncConfig, local: Address) -> Vec<SubscriptionRequest> {
    let per_index = ComponentKind::ALL.len();
    let mut plan = Vec::with_capacity(config.entity_index_bound as usize * per_index + 1);

    for index in 1..=config.entity_index_bound {
        for kind in ComponentKind::ALL {
            plan.push(SubscriptionRequest::new(kind, vec![index as u64]));
        }
    }

    plan.push(SubscriptionRequest::new(
        ComponentKind::PlayerId,
        vec![local.0],
    ));

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn config_with_bound(bound: u32) -> SyncConfig {
        SyncConfig {
            entity_index_bound: bound,
            ..SyncConfig::default()
        }
    }

    #[test]
    fn test_plan_size() {
        let local = Address::new(0xAA);
        let plan = subscription_plan(&config_with_bound(20), local);
        assert_eq!(plan.len(), 20 * ComponentKind::ALL.len() + 1);
    }

    #[test]
    fn test_bound_is_respected() {
        let local = Address::new(0xAA);
        let plan = subscription_plan(&config_with_bound(3), local);

        for sub in &plan {
            let key = sub.keys[0];
            assert!(key >= 1 && key <= 3 || key == local.0, "key {key} out of range");
        }
    }

    #[test]
    fn test_one_subscription_per_kind_per_index() {
        let local = Address::new(0xAA);
        let plan = subscription_plan(&config_with_bound(5), local);

        let unique: HashSet<_> = plan
            .iter()
            .map(|s| (s.kind, s.keys.clone()))
            .collect();
        assert_eq!(unique.len(), plan.len(), "duplicate subscription in plan");

        for index in 1..=5u64 {
            for kind in ComponentKind::ALL {
                assert!(plan
                    .iter()
                    .any(|s| s.kind == kind && s.keys == vec![index]));
            }
        }
    }

    #[test]
    fn test_identity_entry_is_last() {
        let local = Address::new(0xBEEF);
        let plan = subscription_plan(&config_with_bound(2), local);
        let last = plan.last().unwrap();
        assert_eq!(last.kind, ComponentKind::PlayerId);
        assert_eq!(last.keys, vec![local.0]);
    }

    #[test]
    fn test_plan_deterministic() {
        let local = Address::new(0xAA);
        let a = subscription_plan(&config_with_bound(7), local);
        let b = subscription_plan(&config_with_bound(7), local);
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_bound_keeps_identity_entry() {
        let local = Address::new(0xAA);
        let plan = subscription_plan(&config_with_bound(0), local);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].kind, ComponentKind::PlayerId);
    }
}
