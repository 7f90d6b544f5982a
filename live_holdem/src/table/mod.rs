//! Table module providing multi-table support with async actor model.
//!
//! This module implements:
//! - TableActor: async actor owning one [`PokerTable`](crate::game::PokerTable)
//! - TableManager: registry spawning and locating table actors
//! - Message-based communication with tokio channels
//! - Table configuration
//!
//! ## Architecture
//!
//! Each table runs in a separate Tokio task with an mpsc message inbox.
//! The actor applies one message at a time, drains the table's events and
//! fans them out to its observers before looking at the next message, so
//! every player sees a table's events in the order they happened.
//!
//! ## Example
//!
//! ```no_run
//! use live_holdem::table::{TableConfig, TableManager};
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = TableManager::new(Vec::new());
//!     let table_id = manager
//!         .create_table(TableConfig::default(), None)
//!         .await
//!         .unwrap();
//!
//!     let handle = manager.get_table(table_id).await.unwrap();
//!     handle.add_player(uuid::Uuid::new_v4(), 1000).await.unwrap();
//! }
//! ```

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{TableActor, TableHandle};
pub use config::{TableConfig, TableSpeed};
pub use manager::TableManager;
pub use messages::{PlayerSummary, TableMessage, TableSummary};
