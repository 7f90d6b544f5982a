//! Lobby bookkeeping models.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;

/// How long an idle, empty table lives before it is closed.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30);
/// How long a table with enough players idles before the next hand is dealt.
pub const DEFAULT_TTS: Duration = Duration::from_secs(5);
/// How often the scheduler looks at its tables.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Lobby scheduler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LobbySettings {
    pub ttl: Duration,
    pub tts: Duration,
    pub poll_interval: Duration,
}

impl Default for LobbySettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            tts: DEFAULT_TTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// What the scheduler knows about one tracked table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyInfo {
    pub started: bool,
    pub players: usize,
    pub min_players: usize,
    pub last_activity: Instant,
    pub ttl: Duration,
    pub tts: Duration,
}

impl LobbyInfo {
    #[must_use]
    pub fn new(min_players: usize, settings: &LobbySettings) -> Self {
        Self {
            started: false,
            players: 0,
            min_players,
            last_activity: Instant::now(),
            ttl: settings.ttl,
            tts: settings.tts,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Idle between hands with enough players to deal.
    #[must_use]
    pub fn ready_to_start(&self, now: Instant) -> bool {
        !self.started
            && self.players >= self.min_players
            && now.duration_since(self.last_activity) >= self.tts
    }

    /// Empty for longer than its time to live.
    #[must_use]
    pub fn expired(&self, now: Instant) -> bool {
        self.players == 0 && now.duration_since(self.last_activity) >= self.ttl
    }
}
