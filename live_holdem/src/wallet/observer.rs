//! Pushes end-of-hand chip counts to the balance updater.

use std::sync::Arc;
use tokio::{runtime::Handle, sync::mpsc};

use super::updater::BalanceUpdater;
use crate::game::{
    entities::{Chips, PlayerId, TableId},
    events::{EventKind, Observer, TableEvent},
};

struct BalanceUpdate {
    table_id: TableId,
    ids: Vec<PlayerId>,
    balances: Vec<Chips>,
}

/// Forwards every `players-stats` event to a [`BalanceUpdater`]. A single
/// worker task writes the updates in the order the events were seen;
/// failures are logged and the table carries on.
pub struct BalanceObserver {
    sender: Option<mpsc::UnboundedSender<BalanceUpdate>>,
}

impl BalanceObserver {
    /// Spawns the writer on the current runtime. Outside a runtime the
    /// observer only logs what it could not persist.
    #[must_use]
    pub fn new(updater: Arc<dyn BalanceUpdater>) -> Self {
        let Ok(runtime) = Handle::try_current() else {
            log::warn!("No runtime to persist balances on, wallet updates are disabled");
            return Self { sender: None };
        };

        let (sender, receiver) = mpsc::unbounded_channel();
        runtime.spawn(write_balances(updater, receiver));
        Self {
            sender: Some(sender),
        }
    }
}

async fn write_balances(
    updater: Arc<dyn BalanceUpdater>,
    mut receiver: mpsc::UnboundedReceiver<BalanceUpdate>,
) {
    while let Some(update) = receiver.recv().await {
        if let Err(e) = updater.update_balances(&update.ids, &update.balances).await {
            log::warn!(
                "Table {}: failed to update balances: {}",
                update.table_id,
                e
            );
        }
    }
}

impl Observer for BalanceObserver {
    fn notify(&self, _recipients: &[PlayerId], event: &TableEvent) {
        let EventKind::PlayersStats { players } = &event.event else {
            return;
        };
        if players.is_empty() {
            return;
        }

        let (ids, balances): (Vec<PlayerId>, Vec<Chips>) =
            players.iter().map(|p| (p.player_id, p.balance)).unzip();
        let update = BalanceUpdate {
            table_id: event.table_id,
            ids,
            balances,
        };

        let sent = self
            .sender
            .as_ref()
            .is_some_and(|sender| sender.send(update).is_ok());
        if !sent {
            log::warn!(
                "Table {}: balance writer is gone, {} balances not persisted",
                event.table_id,
                players.len()
            );
        }
    }
}
