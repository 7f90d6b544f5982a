//! Poker game engine - rules, hand evaluation and the table state machine.
//!
//! This module provides:
//! - Cards, decks, players and pots
//! - Hand evaluation, side pot construction and showdown resolution
//! - The synchronous per-table state machine
//! - The event taxonomy tables report through

pub mod constants;
pub mod entities;
pub mod errors;
pub mod events;
pub mod functional;
pub mod state_machine;

pub use errors::{ErrorKind, TableError, TableResult, WinnerError};
pub use events::{EventKind, Observer, TableEvent};
pub use state_machine::PokerTable;
