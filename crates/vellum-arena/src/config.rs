//! Arena configuration parameters.

use vellum_core::ConfigError;

/// Configuration for the node arena.
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Number of handle slots to preallocate.
    ///
    /// Default: 64. Purely a sizing hint; the table grows on demand.
    pub initial_capacity: usize,

    /// Upper bound on simultaneously live nodes.
    ///
    /// Default: `None` (unbounded). When set it must be at least 1.
    /// Registering a node beyond the limit fails with
    /// [`NodeError::CapacityExceeded`](vellum_core::NodeError::CapacityExceeded).
    pub max_live_nodes: Option<u32>,
}

impl ArenaConfig {
    /// Default number of preallocated handle slots.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 64;

    /// Check the configuration for values the arena cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_live_nodes == Some(0) {
            return Err(ConfigError::ZeroNodeLimit);
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            max_live_nodes: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unbounded_and_valid() {
        let config = ArenaConfig::default();
        assert_eq!(config.max_live_nodes, None);
        assert_eq!(config.initial_capacity, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_limit_rejected() {
        let config = ArenaConfig {
            max_live_nodes: Some(0),
            ..ArenaConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroNodeLimit));
    }
}
