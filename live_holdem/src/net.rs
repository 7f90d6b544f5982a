//! Delivery of table events to connected players.
//!
//! The transport itself (WebSocket, TCP, ...) lives outside this crate; it
//! holds the receiving end of each player's session channel.

/// Per-player event channels fed by every table.
pub mod broadcast;
