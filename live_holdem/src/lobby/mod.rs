//! Lobby scheduling: deciding when tables deal their next hand and when
//! abandoned tables are torn down.

pub mod models;
pub mod scheduler;

pub use models::{LobbyInfo, LobbySettings};
pub use scheduler::{LobbyScheduler, TableLifecycle};
