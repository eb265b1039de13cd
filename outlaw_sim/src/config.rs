//! Simulation configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use outlaw::{MAX_PLAYERS, MIN_PLAYERS, MatchConfig};

/// Complete simulation configuration
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of concurrent matches
    pub matches: usize,
    /// Players seated at each match
    pub players: usize,
    /// Base seed; match `i` uses `seed + i`
    pub seed: Option<u64>,
    /// Commands after which a match is reported unfinished
    pub max_commands: usize,
    /// Per-match actor settings
    pub match_config: MatchConfig,
}

/// CLI values that take priority over the environment
#[derive(Debug, Default)]
pub struct Overrides {
    pub matches: Option<usize>,
    pub players: Option<usize>,
    pub seed: Option<u64>,
    pub max_commands: Option<usize>,
}

impl SimConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `overrides` - Values parsed from the command line
    pub fn from_env(overrides: Overrides) -> Self {
        let match_config = MatchConfig {
            seed: None,
            inbox_capacity: parse_env_or("OUTLAW_INBOX_CAPACITY", 100),
            notification_capacity: parse_env_or("OUTLAW_NOTIFICATION_CAPACITY", 32),
        };

        Self {
            matches: overrides
                .matches
                .unwrap_or_else(|| parse_env_or("OUTLAW_MATCHES", 4)),
            players: overrides
                .players
                .unwrap_or_else(|| parse_env_or("OUTLAW_PLAYERS", 5)),
            seed: overrides.seed.or_else(|| {
                std::env::var("OUTLAW_SEED")
                    .ok()
                    .and_then(|v| v.parse().ok())
            }),
            max_commands: overrides
                .max_commands
                .unwrap_or_else(|| parse_env_or("OUTLAW_MAX_COMMANDS", 5_000)),
            match_config,
        }
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.matches == 0 {
            return Err(ConfigError::Invalid {
                var: "OUTLAW_MATCHES".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.players) {
            return Err(ConfigError::Invalid {
                var: "OUTLAW_PLAYERS".to_string(),
                reason: format!("Must be between {MIN_PLAYERS} and {MAX_PLAYERS}"),
            });
        }

        if self.max_commands == 0 {
            return Err(ConfigError::Invalid {
                var: "OUTLAW_MAX_COMMANDS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        self.match_config
            .validate()
            .map_err(|reason| ConfigError::Invalid {
                var: "OUTLAW_INBOX_CAPACITY / OUTLAW_NOTIFICATION_CAPACITY".to_string(),
                reason,
            })
    }

    /// Configuration for match number `index`
    pub fn match_config(&self, index: usize) -> MatchConfig {
        MatchConfig {
            seed: self.seed.map(|seed| seed.wrapping_add(index as u64)),
            ..self.match_config.clone()
        }
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
