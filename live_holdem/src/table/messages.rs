//! Table actor message types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::oneshot;

use crate::game::{
    entities::{Action, Card, Chips, PlayerId, Round, TableId},
    errors::TableResult,
    events::Observer,
};

use super::config::TableConfig;

/// Messages that can be sent to a TableActor
pub enum TableMessage {
    /// Seat a player, or queue them if a hand is running
    AddPlayer {
        player_id: PlayerId,
        balance: Chips,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Remove a player (folds them first when mid-hand)
    RemovePlayer {
        player_id: PlayerId,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Player action (fold, check, call, raise, all-in)
    MakeMove {
        player_id: PlayerId,
        action: Action,
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Deal a new hand
    StartGame {
        response: oneshot::Sender<TableResult<()>>,
    },

    /// Get current table state
    GetSummary {
        response: oneshot::Sender<TableSummary>,
    },

    /// Whether the player is seated or queued here
    HasPlayer {
        player_id: PlayerId,
        response: oneshot::Sender<bool>,
    },

    /// Register another sink for this table's events
    AddObserver { observer: Arc<dyn Observer> },

    /// Close table
    Close { response: oneshot::Sender<()> },
}

/// One seat as seen from outside the table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub balance: Chips,
    pub last_bet: Chips,
    pub folded: bool,
    pub queued: bool,
}

/// Table state snapshot
#[derive(Clone, Debug, Serialize)]
pub struct TableSummary {
    pub table_id: TableId,
    pub config: TableConfig,
    pub current_players: usize,
    pub started: bool,
    pub round: Option<Round>,
    pub hand_count: u64,
    pub small_blind: Chips,
    pub current_bet: Chips,
    pub pot_total: Chips,
    pub community: Vec<Card>,
    pub dealer: Option<PlayerId>,
    pub turn: Option<PlayerId>,
    pub players: Vec<PlayerSummary>,
    pub created_at: DateTime<Utc>,
}

impl TableSummary {
    #[must_use]
    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }

    #[must_use]
    pub fn open_seats(&self) -> usize {
        self.config.max_players.saturating_sub(self.current_players)
    }
}
