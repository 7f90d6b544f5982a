//! Table configuration models.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, time::Duration};

use crate::game::{
    constants::{DEFAULT_MAX_PLAYERS, DEFAULT_SMALL_BLIND, MAX_PLAYERS, MIN_PLAYERS},
    entities::Chips,
    errors::{TableError, TableResult},
};

/// Turn timer presets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableSpeed {
    Normal,
    #[default]
    Turbo,
    Hyper,
    /// No turn timer, players may think forever.
    Untimed,
}

impl fmt::Display for TableSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableSpeed::Normal => write!(f, "normal"),
            TableSpeed::Turbo => write!(f, "turbo"),
            TableSpeed::Hyper => write!(f, "hyper"),
            TableSpeed::Untimed => write!(f, "untimed"),
        }
    }
}

impl FromStr for TableSpeed {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(TableSpeed::Normal),
            "turbo" => Ok(TableSpeed::Turbo),
            "hyper" => Ok(TableSpeed::Hyper),
            "untimed" => Ok(TableSpeed::Untimed),
            other => Err(TableError::InvalidConfig(format!(
                "unknown table speed '{other}'"
            ))),
        }
    }
}

/// Table configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Maximum number of players (default: 10)
    pub max_players: usize,

    /// Players needed before the lobby scheduler starts a cash game
    pub min_players: usize,

    /// Small blind amount, the big blind is always twice this
    pub small_blind: Chips,

    /// Ante collected from every seat before the cards are dealt
    pub ante: Chips,

    /// Fixed stack every player sits down with, 0 keeps the player's balance
    pub bank_amount: Chips,

    /// Cash game: players may join between and during hands. Otherwise the
    /// table is a sit-n-go that only starts once full and admits nobody
    /// after the first deal.
    #[serde(rename = "cache_game")]
    pub enter_after_start: bool,

    /// Seconds between blind doublings, 0 keeps blinds fixed
    pub blind_increase_secs: u64,

    /// Turn timer preset
    pub speed: TableSpeed,

    /// Deck seed, 0 shuffles from entropy. A fixed seed replays the same deals.
    pub seed: u64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_players: DEFAULT_MAX_PLAYERS,
            min_players: MIN_PLAYERS,
            small_blind: DEFAULT_SMALL_BLIND,
            ante: 0,
            bank_amount: 0,
            enter_after_start: true,
            blind_increase_secs: 0,
            speed: TableSpeed::default(),
            seed: 0,
        }
    }
}

impl TableConfig {
    /// Validate configuration
    pub fn validate(&self) -> TableResult<()> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.max_players) {
            return Err(TableError::InvalidConfig(format!(
                "max players must be between {MIN_PLAYERS} and {MAX_PLAYERS}"
            )));
        }

        if !(MIN_PLAYERS..=self.max_players).contains(&self.min_players) {
            return Err(TableError::InvalidConfig(format!(
                "min players must be between {MIN_PLAYERS} and {}",
                self.max_players
            )));
        }

        if self.small_blind == 0 {
            return Err(TableError::InvalidConfig(
                "small blind must be positive".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn big_blind(&self) -> Chips {
        self.small_blind.saturating_mul(2)
    }

    /// Players the lobby waits for before dealing. A sit-n-go only starts
    /// once every seat is taken.
    #[must_use]
    pub fn lobby_min_players(&self) -> usize {
        if self.enter_after_start {
            self.min_players
        } else {
            self.max_players
        }
    }

    /// Get action timeout based on table speed
    #[must_use]
    pub fn action_timeout_secs(&self) -> Option<u64> {
        match self.speed {
            TableSpeed::Normal => Some(30),
            TableSpeed::Turbo => Some(15),
            TableSpeed::Hyper => Some(5),
            TableSpeed::Untimed => None,
        }
    }

    #[must_use]
    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_secs().map(Duration::from_secs)
    }

    #[must_use]
    pub fn blind_increase_interval(&self) -> Option<Duration> {
        (self.blind_increase_secs > 0).then(|| Duration::from_secs(self.blind_increase_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TableConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.big_blind(), 100);
        assert_eq!(config.action_timeout_secs(), Some(15));
    }

    #[test]
    fn test_validate_bounds() {
        let config = TableConfig {
            max_players: 24,
            ..TableConfig::default()
        };
        assert!(matches!(config.validate(), Err(TableError::InvalidConfig(_))));

        let config = TableConfig {
            max_players: 4,
            min_players: 5,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TableConfig {
            small_blind: 0,
            ..TableConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lobby_min_players_for_sit_n_go() {
        let config = TableConfig {
            max_players: 6,
            enter_after_start: false,
            ..TableConfig::default()
        };
        assert_eq!(config.lobby_min_players(), 6);
        assert_eq!(TableConfig::default().lobby_min_players(), 2);
    }

    #[test]
    fn test_serde_uses_cache_game() {
        let json = serde_json::to_value(TableConfig::default()).unwrap();
        assert_eq!(json["cache_game"], true);
        assert!(json.get("enter_after_start").is_none());

        let parsed: TableConfig =
            serde_json::from_str(r#"{"max_players": 6, "speed": "hyper"}"#).unwrap();
        assert_eq!(parsed.max_players, 6);
        assert_eq!(parsed.speed, TableSpeed::Hyper);
        assert_eq!(parsed.small_blind, DEFAULT_SMALL_BLIND);
        assert_eq!(parsed.seed, 0);
    }

    #[test]
    fn test_seed_is_set_at_creation() {
        let parsed: TableConfig = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
        assert_eq!(parsed.seed, 42);

        let config = TableConfig {
            seed: 1488,
            ..TableConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TableConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_speed_parse() {
        assert_eq!("Normal".parse::<TableSpeed>().unwrap(), TableSpeed::Normal);
        assert!("ludicrous".parse::<TableSpeed>().is_err());
    }
}
