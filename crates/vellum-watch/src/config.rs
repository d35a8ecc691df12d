//! Watcher configuration.

use std::time::Duration;

use vellum_core::ConfigError;

/// Polling parameters for [`FileWatcher`](crate::FileWatcher).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchConfig {
    /// Minimum time between two polls, in milliseconds. Must be nonzero.
    pub interval_ms: u64,
}

impl WatchConfig {
    /// Default poll interval: one second.
    pub const DEFAULT_INTERVAL_MS: u64 = 1000;

    /// Config with the given interval.
    pub fn with_interval_ms(interval_ms: u64) -> Self {
        Self { interval_ms }
    }

    /// The interval as a [`Duration`].
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Reject a zero interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroWatchInterval);
        }
        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: Self::DEFAULT_INTERVAL_MS,
        }
    }
}
