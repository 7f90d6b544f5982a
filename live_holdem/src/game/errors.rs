use serde::Serialize;
use thiserror::Error;

use super::entities::{Chips, PlayerId, TableId};

/// Broad categories callers branch on without matching every variant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    NotFound,
    StateConflict,
    RuleViolation,
    CapacityExceeded,
    Unavailable,
}

#[derive(Clone, Debug, Eq, Error, PartialEq, Serialize)]
pub enum TableError {
    #[error("table {0} not found")]
    TableNotFound(TableId),
    #[error("player {0} is not at this table")]
    PlayerNotFound(PlayerId),
    #[error("player {0} is already seated")]
    PlayerAlreadySeated(PlayerId),
    #[error("table is full ({max} players)")]
    MaxPlayers { max: usize },
    #[error("game already started")]
    GameStarted,
    #[error("game not started")]
    GameNotStarted,
    #[error("need at least 2 players to start, have {have}")]
    NotEnoughPlayers { have: usize },
    #[error("not your turn")]
    NotYourTurn,
    #[error("player has already folded")]
    PlayerFolded,
    #[error("cannot check while owing {owed}")]
    CantCheck { owed: Chips },
    #[error("raise must be at least {min}")]
    RaiseTooSmall { min: Chips },
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Chips, available: Chips },
    #[error("unexpected action: {0}")]
    UnexpectedAction(String),
    #[error("table would hold more than {max} chips")]
    ChipLimit { max: Chips },
    #[error("invalid table config: {0}")]
    InvalidConfig(String),
    #[error("table is closed")]
    TableClosed,
}

impl TableError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TableNotFound(_) | Self::PlayerNotFound(_) => ErrorKind::NotFound,
            Self::PlayerAlreadySeated(_)
            | Self::GameStarted
            | Self::GameNotStarted
            | Self::NotEnoughPlayers { .. }
            | Self::NotYourTurn
            | Self::PlayerFolded => ErrorKind::StateConflict,
            Self::CantCheck { .. }
            | Self::RaiseTooSmall { .. }
            | Self::InsufficientFunds { .. }
            | Self::UnexpectedAction(_)
            | Self::ChipLimit { .. }
            | Self::InvalidConfig(_) => ErrorKind::RuleViolation,
            Self::MaxPlayers { .. } => ErrorKind::CapacityExceeded,
            Self::TableClosed => ErrorKind::Unavailable,
        }
    }
}

pub type TableResult<T> = Result<T, TableError>;

/// Failures of the showdown resolver.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum WinnerError {
    #[error("no contenders left to compare")]
    EmptyContenders,
    #[error("showdown needs 5 community cards, got {0}")]
    CommunityCards(usize),
    #[error("player {0} holds no cards")]
    MissingHand(PlayerId),
}
