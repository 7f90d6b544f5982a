//! # Live Hold'em
//!
//! The server-side core of live multi-player Texas Hold'em: a table state
//! machine that enforces the betting rules, deals, builds side pots and
//! settles showdowns, plus a lobby scheduler that deals the next hand on
//! idle tables and tears down abandoned ones.
//!
//! ## Core Modules
//!
//! - [`game`]: Cards, hand evaluation, pots and the table state machine
//! - [`table`]: One async actor per table and the table registry
//! - [`lobby`]: Time-driven autostart and cleanup
//! - [`wallet`]: Where settled balances are written
//! - [`net`]: Per-player event delivery
//! - [`engine`]: The facade a transport layer calls
//!
//! ## Example
//!
//! ```
//! use live_holdem::game::{
//!     entities::{Card, Rank, Suit},
//!     functional::evaluate_hand,
//! };
//!
//! let hand = evaluate_hand(
//!     &[Card(14, Suit::Spade), Card(13, Suit::Spade)],
//!     &[Card(12, Suit::Spade), Card(11, Suit::Spade), Card(10, Suit::Spade)],
//! );
//! assert_eq!(hand.rank, Rank::RoyalFlush);
//! ```

/// Core game logic, entities, and state machine.
pub mod game;
pub use game::{
    PokerTable, TableError,
    constants::{self, MAX_PLAYERS},
    entities, functional,
};

/// Table actors and the table registry.
pub mod table;

/// Lobby scheduler.
pub mod lobby;

/// Balance persistence seam.
pub mod wallet;

/// Event delivery to player sessions.
pub mod net;

/// Facade over tables, lobby, sessions and wallet.
pub mod engine;
pub use engine::HoldemEngine;
