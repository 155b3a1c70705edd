//! # Controller configuration.
//!
//! Provides [`SuspendConfig`], centralized settings for the suspend controller.
//!
//! ## Sentinel values
//! - `default_timeout = 0s` → no advisory timer
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

/// Configuration for the suspend controller.
///
/// ## Field semantics
/// - `start_suspended`: stay `Suspended` after boot completes (explicit `resume()` needed)
/// - `default_timeout`: advisory timeout used by `suspend_default()` (`0s` = none)
/// - `bus_capacity`: event bus ring buffer size (min 1)
#[derive(Clone, Debug)]
pub struct SuspendConfig {
    /// Keep the server suspended once boot completes.
    ///
    /// When `false`, the first [`boot_complete`](crate::SuspendController::boot_complete)
    /// resumes every registered activity.
    pub start_suspended: bool,

    /// Advisory timeout for suspends that do not pass one explicitly.
    ///
    /// - `Duration::ZERO` = no timer
    /// - `> 0` = listeners get `timeout()` once it elapses; the drain continues
    pub default_timeout: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,
}

impl SuspendConfig {
    /// Returns the default timeout as an `Option` (`None` = no timer).
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        if self.default_timeout.is_zero() {
            None
        } else {
            Some(self.default_timeout)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for SuspendConfig {
    /// Default configuration:
    ///
    /// - `start_suspended = false`
    /// - `default_timeout = 0s` (no advisory timer)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            start_suspended: false,
            default_timeout: Duration::ZERO,
            bus_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        let mut cfg = SuspendConfig::default();
        assert_eq!(cfg.timeout(), None);
        cfg.default_timeout = Duration::from_millis(10);
        assert_eq!(cfg.timeout(), Some(Duration::from_millis(10)));
        cfg.bus_capacity = 0;
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
