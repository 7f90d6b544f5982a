//! Background loop that auto-starts ready tables and reaps empty ones.

use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

use super::models::{LobbyInfo, LobbySettings};
use crate::game::{
    entities::{PlayerId, TableId},
    errors::{TableError, TableResult},
    events::{EventKind, Observer, TableEvent},
};

/// What the scheduler needs from the table registry.
#[async_trait]
pub trait TableLifecycle: Send + Sync {
    async fn start_table(&self, table_id: TableId) -> TableResult<()>;
    async fn close_table(&self, table_id: TableId) -> TableResult<()>;
}

pub struct LobbyScheduler {
    settings: LobbySettings,
    lobbies: Mutex<HashMap<TableId, LobbyInfo>>,
}

impl LobbyScheduler {
    #[must_use]
    pub fn new(settings: LobbySettings) -> Self {
        Self {
            settings,
            lobbies: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &LobbySettings {
        &self.settings
    }

    // Entries stay consistent even if a holder panicked, so poisoning is
    // not fatal here.
    fn lock(&self) -> MutexGuard<'_, HashMap<TableId, LobbyInfo>> {
        self.lobbies.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts tracking a table.
    pub fn track(&self, table_id: TableId, min_players: usize) {
        self.lock()
            .insert(table_id, LobbyInfo::new(min_players, &self.settings));
    }

    pub fn untrack(&self, table_id: TableId) -> bool {
        self.lock().remove(&table_id).is_some()
    }

    /// Counts a player in. Returns false when the table is not tracked.
    pub fn add_player(&self, table_id: TableId) -> bool {
        self.update(table_id, |info| {
            info.players += 1;
            info.touch();
        })
    }

    pub fn remove_player(&self, table_id: TableId) -> bool {
        self.update(table_id, |info| {
            info.players = info.players.saturating_sub(1);
            info.touch();
        })
    }

    #[must_use]
    pub fn lobby(&self, table_id: TableId) -> Option<LobbyInfo> {
        self.lock().get(&table_id).cloned()
    }

    #[must_use]
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    fn update(&self, table_id: TableId, f: impl FnOnce(&mut LobbyInfo)) -> bool {
        match self.lock().get_mut(&table_id) {
            Some(info) => {
                f(info);
                true
            }
            None => false,
        }
    }

    /// Decides under the lock which tables to start and which to close.
    /// Tables picked for a start are marked started straight away so the
    /// next tick cannot pick them again.
    fn plan(&self) -> (Vec<TableId>, Vec<TableId>) {
        let now = Instant::now();
        let mut lobbies = self.lock();

        let mut to_start = Vec::new();
        for (id, info) in lobbies.iter_mut() {
            if info.ready_to_start(now) {
                info.started = true;
                to_start.push(*id);
            }
        }

        let to_close: Vec<TableId> = lobbies
            .iter()
            .filter(|(_, info)| info.expired(now))
            .map(|(id, _)| *id)
            .collect();
        for id in &to_close {
            lobbies.remove(id);
        }

        (to_start, to_close)
    }

    /// One scheduling pass. The lock is released before any table is called.
    pub async fn tick(&self, lifecycle: &dyn TableLifecycle) {
        let (to_start, to_close) = self.plan();

        for table_id in to_start {
            match lifecycle.start_table(table_id).await {
                Ok(()) => log::debug!("Lobby started table {}", table_id),
                Err(TableError::GameStarted) => {
                    log::debug!("Table {} was already dealing", table_id);
                }
                Err(TableError::NotEnoughPlayers { have }) => {
                    log::debug!("Table {} not started, only {} players", table_id, have);
                    self.update(table_id, |info| info.started = false);
                }
                Err(e @ (TableError::TableNotFound(_) | TableError::TableClosed)) => {
                    log::warn!("Lobby dropping table {}: {}", table_id, e);
                    self.untrack(table_id);
                }
                Err(e) => log::warn!("Failed to start table {}: {}", table_id, e),
            }
        }

        for table_id in to_close {
            match lifecycle.close_table(table_id).await {
                Ok(()) => log::info!("Lobby closed idle table {}", table_id),
                Err(e) => log::warn!("Failed to close idle table {}: {}", table_id, e),
            }
        }
    }

    /// Runs until `shutdown` is cancelled, one pass per poll interval.
    pub async fn run(self: Arc<Self>, lifecycle: Arc<dyn TableLifecycle>, shutdown: CancellationToken) {
        let mut ticker = interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        log::info!("Lobby scheduler running every {:?}", self.settings.poll_interval);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick(lifecycle.as_ref()).await,
            }
        }

        log::info!("Lobby scheduler stopped");
    }
}

impl Observer for LobbyScheduler {
    fn notify(&self, _recipients: &[PlayerId], event: &TableEvent) {
        let table_id = event.table_id;
        match &event.event {
            EventKind::GameStarted { .. } => {
                self.update(table_id, |info| info.started = true);
            }
            EventKind::StopGame { players_remaining } => {
                self.update(table_id, |info| {
                    info.started = false;
                    info.players = *players_remaining;
                    info.touch();
                });
            }
            EventKind::Do { .. } => {
                self.update(table_id, LobbyInfo::touch);
            }
            EventKind::PlayerLeft {
                players_remaining, ..
            } => {
                self.update(table_id, |info| info.players = *players_remaining);
            }
            _ => {}
        }
    }
}
