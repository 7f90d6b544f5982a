//! Wallet error types.

use thiserror::Error;

use crate::game::entities::PlayerId;

/// Wallet errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    /// Ids and balances must pair up one to one
    #[error("Length mismatch: {ids} player ids, {balances} balances")]
    LengthMismatch { ids: usize, balances: usize },

    /// Wallet not found
    #[error("Wallet not found for player {0}")]
    UnknownPlayer(PlayerId),

    /// The balance store failed
    #[error("Balance store error: {0}")]
    Backend(String),
}

impl WalletError {
    /// Get a client-safe error message that doesn't leak player ids or
    /// storage details
    pub fn client_message(&self) -> String {
        match self {
            WalletError::UnknownPlayer(_) => "Wallet not found".to_string(),
            WalletError::Backend(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
