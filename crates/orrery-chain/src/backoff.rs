//! Reconnect backoff policy for the sync stream

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Exponential backoff with a cap.
///
/// `delay(retry)` is pure: retry 0 gets the initial delay, each further
/// retry multiplies by `factor` until `max`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Backoff {
    pub initial: Duration,
    pub factor: f64,
    pub max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_millis(500),
            factor: 2.0,
            max: Duration::from_secs(30),
        }
    }
}

impl Backoff {
    /// Delay before the given retry (0-based)
    pub fn delay(&self, retry: u32) -> Duration {
        // Past ~2^16 the cap has long since won; bound the exponent so the
        // multiply stays finite.
        let exp = retry.min(16) as i32;
        let scaled = self.initial.mul_f64(self.factor.powi(exp));
        scaled.min(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_then_caps() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(0), Duration::from_millis(500));
        assert_eq!(backoff.delay(1), Duration::from_secs(1));
        assert_eq!(backoff.delay(2), Duration::from_secs(2));
        assert_eq!(backoff.delay(10), Duration::from_secs(30));
        assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(30));
    }

    #[test]
    fn test_backoff_monotone() {
        let backoff = Backoff::default();
        for retry in 0..20 {
            assert!(backoff.delay(retry) <= backoff.delay(retry + 1));
        }
    }
}
