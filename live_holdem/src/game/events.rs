//! Notifications a table emits as it changes state.
//!
//! The wire tag of every [`EventKind`] is stable and shared with clients,
//! see [`EventKind::event_type`].

use serde::{Deserialize, Serialize};

use super::entities::{Action, ActionChoice, Card, Chips, Combination, Hand, PlayerId, Round, TableId};

/// One seat's chip count, as reported when a hand ends or a player leaves.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub balance: Chips,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum EventKind {
    PlayerEntered {
        player_id: PlayerId,
        balance: Chips,
        queued: bool,
    },
    PlayerLeft {
        player_id: PlayerId,
        players_remaining: usize,
    },
    GameStarted {
        hand: u64,
    },
    NewRound {
        round: Round,
    },
    /// Private: the recipient's hole cards.
    GetCards {
        hand: Hand,
    },
    CommunityCards {
        cards: Vec<Card>,
    },
    Dealer {
        player_id: PlayerId,
    },
    SmallBlind {
        player_id: PlayerId,
        amount: Chips,
    },
    BigBlind {
        player_id: PlayerId,
        amount: Chips,
    },
    BlindsIncreased {
        small_blind: Chips,
    },
    NextMove {
        player_id: PlayerId,
        timeout_secs: Option<u64>,
    },
    /// Private: the moves open to the player on turn.
    CanDo {
        choices: Vec<ActionChoice>,
    },
    Do {
        player_id: PlayerId,
        action: Action,
        bet: Chips,
        balance: Chips,
    },
    /// Private: why the last move was refused.
    BadMove {
        reason: String,
    },
    CantAnte {
        player_id: PlayerId,
        ante: Chips,
    },
    GetAnte {
        amount: Chips,
    },
    WinPot {
        winners: Vec<PlayerId>,
        amount: Chips,
        combination: Option<Combination>,
    },
    WinAll {
        player_id: PlayerId,
        amount: Chips,
    },
    StopGame {
        players_remaining: usize,
    },
    PlayersStats {
        players: Vec<PlayerStats>,
    },
}

impl EventKind {
    /// The stable tag this event carries on the wire.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::PlayerEntered { .. } => "player-entered",
            Self::PlayerLeft { .. } => "player-left",
            Self::GameStarted { .. } => "game-started",
            Self::NewRound { .. } => "new-round",
            Self::GetCards { .. } => "get-cards",
            Self::CommunityCards { .. } => "community-cards",
            Self::Dealer { .. } => "dealer",
            Self::SmallBlind { .. } => "small-blind",
            Self::BigBlind { .. } => "big-blind",
            Self::BlindsIncreased { .. } => "blinds-increased",
            Self::NextMove { .. } => "next-move",
            Self::CanDo { .. } => "can-do",
            Self::Do { .. } => "do",
            Self::BadMove { .. } => "bad-move",
            Self::CantAnte { .. } => "cant-ante",
            Self::GetAnte { .. } => "get-ante",
            Self::WinPot { .. } => "win-pot",
            Self::WinAll { .. } => "win-all",
            Self::StopGame { .. } => "stop-game",
            Self::PlayersStats { .. } => "players-stats",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct TableEvent {
    pub table_id: TableId,
    #[serde(flatten)]
    pub event: EventKind,
}

impl TableEvent {
    #[must_use]
    pub fn new(table_id: TableId, event: EventKind) -> Self {
        Self { table_id, event }
    }

    #[must_use]
    pub fn event_type(&self) -> &'static str {
        self.event.event_type()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// An event together with who should receive it.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub recipients: Vec<PlayerId>,
    pub event: TableEvent,
}

/// Sink for table notifications. Called from the table's task, so
/// implementations must return quickly and never block.
pub trait Observer: Send + Sync {
    fn notify(&self, recipients: &[PlayerId], event: &TableEvent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_event_type_matches_wire_tag() {
        let event = TableEvent::new(
            Uuid::new_v4(),
            EventKind::StopGame {
                players_remaining: 3,
            },
        );
        let json: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "stop-game");
        assert_eq!(json["type"], event.event_type());
        assert_eq!(json["payload"]["players_remaining"], 3);
    }

    #[test]
    fn test_players_stats_tag() {
        let kind = EventKind::PlayersStats { players: vec![] };
        assert_eq!(kind.event_type(), "players-stats");
        let json = serde_json::to_value(&kind).unwrap();
        assert_eq!(json["type"], "players-stats");
    }
}
