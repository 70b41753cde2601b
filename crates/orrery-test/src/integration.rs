//! End-to-end tests
//!
//! These drive the real sync coordinator and action submitter against a
//! `ScriptedChain`, covering the full flows:
//! - Subscription plan delivery and continuous update application
//! - Reconnect with backoff after feed loss and failed opens
//! - The optimistic override lifecycle on every outcome
//! - The assembled `GameClient` with scene projection

use std::time::Duration;

/// Poll a condition until it holds or a bounded number of ticks elapse.
/// Under a paused tokio clock the sleeps auto-advance, so this is instant.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    for _ in 0..1000 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
