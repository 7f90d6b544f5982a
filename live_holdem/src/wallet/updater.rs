//! The seam through which settled chip counts leave the engine.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::errors::{WalletError, WalletResult};
use crate::game::entities::{Chips, PlayerId};

/// Persists player balances. `ids[i]` ends up holding `balances[i]`.
#[async_trait]
pub trait BalanceUpdater: Send + Sync {
    async fn update_balances(&self, ids: &[PlayerId], balances: &[Chips]) -> WalletResult<()>;
}

/// Process-local balance store.
#[derive(Debug, Default)]
pub struct InMemoryWallet {
    balances: RwLock<HashMap<PlayerId, Chips>>,
}

impl InMemoryWallet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn deposit(&self, player_id: PlayerId, amount: Chips) -> Chips {
        let mut balances = self.balances.write().await;
        let balance = balances.entry(player_id).or_default();
        *balance = balance.saturating_add(amount);
        *balance
    }

    pub async fn balance(&self, player_id: PlayerId) -> WalletResult<Chips> {
        let balances = self.balances.read().await;
        balances
            .get(&player_id)
            .copied()
            .ok_or(WalletError::UnknownPlayer(player_id))
    }
}

#[async_trait]
impl BalanceUpdater for InMemoryWallet {
    async fn update_balances(&self, ids: &[PlayerId], balances: &[Chips]) -> WalletResult<()> {
        if ids.len() != balances.len() {
            return Err(WalletError::LengthMismatch {
                ids: ids.len(),
                balances: balances.len(),
            });
        }

        let mut store = self.balances.write().await;
        for (id, balance) in ids.iter().zip(balances) {
            store.insert(*id, *balance);
        }
        Ok(())
    }
}
