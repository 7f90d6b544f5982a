use super::entities::Chips;

/// Hard seat cap. 23 hands of two plus a five card board is 51 cards,
/// so a valid table can never run the deck dry.
pub const MAX_PLAYERS: usize = 23;
pub const MIN_PLAYERS: usize = 2;

pub const DEFAULT_MAX_PLAYERS: usize = 10;
pub const DEFAULT_SMALL_BLIND: Chips = 50;

pub const HOLE_CARDS: usize = 2;
pub const BOARD_CARDS: usize = 5;
pub const FLOP_CARDS: usize = 3;

/// Tables returned per page by the registry listing.
pub const PAGE_SIZE: usize = 50;
