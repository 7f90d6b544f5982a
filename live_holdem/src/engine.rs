//! The entry point a transport layer drives.
//!
//! [`HoldemEngine`] wires the table registry, the lobby scheduler, player
//! sessions and the balance updater together. Every table it creates
//! reports to the same three observers: the session hub (delivery to
//! players), the lobby scheduler (start/teardown bookkeeping) and the
//! balance observer (persistence).

use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    game::{
        entities::{Action, Chips, PlayerId, TableId},
        errors::{TableError, TableResult},
        events::{Observer, TableEvent},
    },
    lobby::{LobbyScheduler, LobbySettings, TableLifecycle},
    net::broadcast::SessionHub,
    table::{TableConfig, TableHandle, TableManager, TableSummary},
    wallet::{BalanceObserver, BalanceUpdater},
};

pub struct HoldemEngine {
    tables: Arc<TableManager>,
    lobby: Arc<LobbyScheduler>,
    sessions: Arc<SessionHub>,
}

impl HoldemEngine {
    #[must_use]
    pub fn new(wallet: Arc<dyn BalanceUpdater>, settings: LobbySettings) -> Self {
        let sessions = Arc::new(SessionHub::default());
        let lobby = Arc::new(LobbyScheduler::new(settings));
        let observers: Vec<Arc<dyn Observer>> = vec![
            sessions.clone(),
            lobby.clone(),
            Arc::new(BalanceObserver::new(wallet)),
        ];

        Self {
            tables: Arc::new(TableManager::new(observers)),
            lobby,
            sessions,
        }
    }

    #[must_use]
    pub fn tables(&self) -> &Arc<TableManager> {
        &self.tables
    }

    #[must_use]
    pub fn lobby(&self) -> &Arc<LobbyScheduler> {
        &self.lobby
    }

    async fn handle(&self, table_id: TableId) -> TableResult<TableHandle> {
        self.tables
            .get_table(table_id)
            .await
            .ok_or(TableError::TableNotFound(table_id))
    }

    /// Creates a table and hands it to the lobby scheduler.
    pub async fn create_table(
        &self,
        config: TableConfig,
        creator_id: Option<PlayerId>,
    ) -> TableResult<TableId> {
        let min_players = config.lobby_min_players();
        let table_id = self.tables.create_table(config, creator_id).await?;
        self.lobby.track(table_id, min_players);
        Ok(table_id)
    }

    pub async fn add_player(
        &self,
        table_id: TableId,
        player_id: PlayerId,
        balance: Chips,
    ) -> TableResult<()> {
        self.handle(table_id)
            .await?
            .add_player(player_id, balance)
            .await?;
        self.lobby.add_player(table_id);
        Ok(())
    }

    /// Applies a move named the way clients send it, e.g. `("raise", 400)`.
    pub async fn submit_move(
        &self,
        player_id: PlayerId,
        table_id: TableId,
        action: &str,
        amount: Chips,
    ) -> TableResult<()> {
        let action = Action::from_parts(action, amount)?;
        self.handle(table_id)
            .await?
            .make_move(player_id, action)
            .await
    }

    /// Deals a hand right away instead of waiting for the scheduler.
    pub async fn start_game(&self, table_id: TableId) -> TableResult<()> {
        self.handle(table_id).await?.start_game().await
    }

    /// The table's `player-left` event updates the lobby's head count.
    pub async fn leave(&self, table_id: TableId, player_id: PlayerId) -> TableResult<()> {
        self.handle(table_id)
            .await?
            .remove_player(player_id)
            .await
    }

    pub async fn close_table(&self, table_id: TableId) -> TableResult<()> {
        self.lobby.untrack(table_id);
        self.tables.close_table(table_id).await
    }

    pub async fn list_tables(&self, page: usize) -> Vec<TableSummary> {
        self.tables.list_tables(page).await
    }

    pub async fn get_table(&self, table_id: TableId) -> TableResult<TableSummary> {
        self.handle(table_id).await?.summary().await
    }

    pub async fn get_table_by_player(&self, player_id: PlayerId) -> TableResult<TableSummary> {
        self.tables
            .find_by_player(player_id)
            .await
            .ok_or(TableError::PlayerNotFound(player_id))?
            .summary()
            .await
    }

    /// Opens the player's event stream.
    pub fn connect(&self, player_id: PlayerId) -> mpsc::Receiver<TableEvent> {
        self.sessions.subscribe(player_id)
    }

    /// Drops the player's session and takes them out of every table.
    pub async fn disconnect(&self, player_id: PlayerId) {
        self.sessions.unsubscribe(player_id);
        for handle in self.tables.tables_with_player(player_id).await {
            if let Err(e) = handle.remove_player(player_id).await {
                log::warn!(
                    "Failed to remove {} from table {}: {}",
                    player_id,
                    handle.table_id(),
                    e
                );
            }
        }
    }

    /// Spawns the lobby scheduler loop. It stops when `shutdown` is cancelled.
    pub fn spawn_scheduler(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        let lifecycle: Arc<dyn TableLifecycle> = self.tables.clone();
        tokio::spawn(self.lobby.clone().run(lifecycle, shutdown))
    }
}
