//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use live_holdem::{
    constants::MAX_PLAYERS,
    lobby::LobbySettings,
    table::{TableConfig, TableSpeed},
};
use std::time::Duration;

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Lobby scheduler timings
    pub lobby: LobbySettings,
    /// Configuration every startup table is created with
    pub table_defaults: TableConfig,
    /// Number of tables to create on startup
    pub num_tables: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `num_tables_override` - Optional number of tables override (from CLI args)
    ///
    /// # Returns
    ///
    /// * `Result<ServerConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if the table speed is not one of the known presets
    pub fn from_env(num_tables_override: Option<usize>) -> Result<Self, ConfigError> {
        let defaults = LobbySettings::default();
        let lobby = LobbySettings {
            ttl: Duration::from_secs(parse_env_or("LOBBY_TTL_SECS", defaults.ttl.as_secs())),
            tts: Duration::from_secs(parse_env_or("LOBBY_TTS_SECS", defaults.tts.as_secs())),
            poll_interval: Duration::from_millis(parse_env_or(
                "LOBBY_POLL_MS",
                defaults.poll_interval.as_millis() as u64,
            )),
        };

        let speed = match std::env::var("DEFAULT_TABLE_SPEED") {
            Ok(v) => v.parse::<TableSpeed>().map_err(|e| ConfigError::Invalid {
                var: "DEFAULT_TABLE_SPEED".to_string(),
                reason: e.to_string(),
            })?,
            Err(_) => TableSpeed::default(),
        };

        let base = TableConfig::default();
        let table_defaults = TableConfig {
            max_players: parse_env_or("DEFAULT_MAX_PLAYERS", base.max_players),
            small_blind: parse_env_or("DEFAULT_SMALL_BLIND", base.small_blind),
            ante: parse_env_or("DEFAULT_ANTE", base.ante),
            speed,
            ..base
        };

        let num_tables = num_tables_override.unwrap_or_else(|| parse_env_or("INITIAL_TABLES", 1));

        Ok(ServerConfig {
            lobby,
            table_defaults,
            num_tables,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lobby.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "LOBBY_POLL_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table_defaults.small_blind == 0 {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_SMALL_BLIND".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.table_defaults.max_players > MAX_PLAYERS {
            return Err(ConfigError::Invalid {
                var: "DEFAULT_MAX_PLAYERS".to_string(),
                reason: format!("Must be at most {MAX_PLAYERS} (max players with 52-card deck)"),
            });
        }

        self.table_defaults
            .validate()
            .map_err(|e| ConfigError::Invalid {
                var: "DEFAULT_MAX_PLAYERS".to_string(),
                reason: e.to_string(),
            })
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
