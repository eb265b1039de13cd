//! Match configuration models.

use serde::{Deserialize, Serialize};

/// Upper bound for either channel capacity.
const MAX_CHANNEL_CAPACITY: usize = 10_000;

/// Match configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Fixed RNG seed. `None` seeds from the OS.
    pub seed: Option<u64>,

    /// Messages the match actor buffers before senders wait (default: 100)
    pub inbox_capacity: usize,

    /// Notifications buffered per subscriber before they are dropped (default: 32)
    pub notification_capacity: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            inbox_capacity: 100,
            notification_capacity: 32,
        }
    }
}

impl MatchConfig {
    /// Seeded configuration with default capacities.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.inbox_capacity == 0 || self.inbox_capacity > MAX_CHANNEL_CAPACITY {
            return Err(format!(
                "Inbox capacity must be between 1 and {MAX_CHANNEL_CAPACITY}"
            ));
        }

        if self.notification_capacity == 0 || self.notification_capacity > MAX_CHANNEL_CAPACITY {
            return Err(format!(
                "Notification capacity must be between 1 and {MAX_CHANNEL_CAPACITY}"
            ));
        }

        Ok(())
    }
}
