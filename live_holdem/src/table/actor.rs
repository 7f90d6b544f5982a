//! Table actor implementation with async message handling.

use super::{
    config::TableConfig,
    messages::{PlayerSummary, TableMessage, TableSummary},
};
use crate::game::{
    PokerTable,
    entities::{Action, Chips, Player, PlayerId, TableId},
    errors::{TableError, TableResult},
    events::Observer,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

/// Table actor handle for sending messages
#[derive(Clone)]
pub struct TableHandle {
    sender: mpsc::Sender<TableMessage>,
    table_id: TableId,
}

impl TableHandle {
    /// Create a new table handle
    pub fn new(sender: mpsc::Sender<TableMessage>, table_id: TableId) -> Self {
        Self { sender, table_id }
    }

    /// Get table ID
    pub fn table_id(&self) -> TableId {
        self.table_id
    }

    /// Send a message to the table
    pub async fn send(&self, message: TableMessage) -> TableResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| TableError::TableClosed)
    }

    /// Send a message carrying a reply channel and wait for the reply.
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> TableMessage,
    ) -> TableResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(build(tx)).await?;
        rx.await.map_err(|_| TableError::TableClosed)
    }

    pub async fn add_player(&self, player_id: PlayerId, balance: Chips) -> TableResult<()> {
        self.request(|response| TableMessage::AddPlayer {
            player_id,
            balance,
            response,
        })
        .await?
    }

    pub async fn remove_player(&self, player_id: PlayerId) -> TableResult<()> {
        self.request(|response| TableMessage::RemovePlayer {
            player_id,
            response,
        })
        .await?
    }

    pub async fn make_move(&self, player_id: PlayerId, action: Action) -> TableResult<()> {
        self.request(|response| TableMessage::MakeMove {
            player_id,
            action,
            response,
        })
        .await?
    }

    pub async fn start_game(&self) -> TableResult<()> {
        self.request(|response| TableMessage::StartGame { response })
            .await?
    }

    pub async fn summary(&self) -> TableResult<TableSummary> {
        self.request(|response| TableMessage::GetSummary { response })
            .await
    }

    pub async fn has_player(&self, player_id: PlayerId) -> TableResult<bool> {
        self.request(|response| TableMessage::HasPlayer {
            player_id,
            response,
        })
        .await
    }

    pub async fn add_observer(&self, observer: Arc<dyn Observer>) -> TableResult<()> {
        self.send(TableMessage::AddObserver { observer }).await
    }

    pub async fn close(&self) -> TableResult<()> {
        self.request(|response| TableMessage::Close { response })
            .await
    }
}

/// Table actor owning a single [`PokerTable`]. Messages are handled one at
/// a time, so every table operation is linearized through the inbox.
pub struct TableActor {
    /// Table ID
    id: TableId,

    /// Game state
    table: PokerTable,

    /// Message inbox
    inbox: mpsc::Receiver<TableMessage>,

    /// Sinks for the table's events, notified in registration order
    observers: Vec<Arc<dyn Observer>>,

    /// Is table closed
    is_closed: bool,

    created_at: DateTime<Utc>,

    /// Turn the timer is armed for
    armed: Option<(PlayerId, u64)>,

    /// When the player on turn runs out of time
    deadline: Option<Instant>,
}

impl TableActor {
    /// Create a new table actor
    ///
    /// # Arguments
    ///
    /// * `id` - Table ID
    /// * `config` - Table configuration
    /// * `observers` - Sinks for every event the table emits
    ///
    /// # Returns
    ///
    /// * `(TableActor, TableHandle)` - Actor and handle for sending messages
    pub fn new(
        id: TableId,
        config: TableConfig,
        observers: Vec<Arc<dyn Observer>>,
    ) -> (Self, TableHandle) {
        let (sender, inbox) = mpsc::channel(100);

        let actor = Self {
            id,
            table: PokerTable::new(id, config),
            inbox,
            observers,
            is_closed: false,
            created_at: Utc::now(),
            armed: None,
            deadline: None,
        };

        let handle = TableHandle::new(sender, id);

        (actor, handle)
    }

    /// Run the table actor event loop
    pub async fn run(mut self) {
        log::info!("Table {} starting", self.id);

        loop {
            let deadline = self.deadline;
            tokio::select! {
                message = self.inbox.recv() => {
                    match message {
                        Some(message) => self.handle_message(message),
                        // Every handle is gone, nobody can reach this table.
                        None => break,
                    }
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.handle_timeout();
                }
            }

            self.publish();
            if self.is_closed {
                break;
            }
            self.rearm_timer();
        }

        log::info!("Table {} closed", self.id);
    }

    /// Handle a table message
    fn handle_message(&mut self, message: TableMessage) {
        match message {
            TableMessage::AddPlayer {
                player_id,
                balance,
                response,
            } => {
                let result = self.table.add_player(Player::new(player_id, balance));
                let _ = response.send(result);
            }

            TableMessage::RemovePlayer {
                player_id,
                response,
            } => {
                let result = self.table.remove_player(player_id);
                let _ = response.send(result);
            }

            TableMessage::MakeMove {
                player_id,
                action,
                response,
            } => {
                let result = self.table.make_move(player_id, action);
                let _ = response.send(result);
            }

            TableMessage::StartGame { response } => {
                let result = self.table.start_game();
                let _ = response.send(result);
            }

            TableMessage::GetSummary { response } => {
                let _ = response.send(self.summary());
            }

            TableMessage::HasPlayer {
                player_id,
                response,
            } => {
                let _ = response.send(self.table.has_player(player_id));
            }

            TableMessage::AddObserver { observer } => {
                self.observers.push(observer);
            }

            TableMessage::Close { response } => {
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// The player on turn ran out of time: check if free, fold otherwise.
    fn handle_timeout(&mut self) {
        self.deadline = None;
        if let Some((player_id, action)) = self.table.timeout_action() {
            log::debug!(
                "Table {}: player {} timed out, playing {:?}",
                self.id,
                player_id,
                action
            );
            if let Err(e) = self.table.make_move(player_id, action) {
                log::error!("Table {}: timeout move failed: {}", self.id, e);
            }
        }
    }

    /// Arms the turn timer whenever the turn changes hands. A turn that is
    /// still the same keeps its original deadline.
    fn rearm_timer(&mut self) {
        let token = self.table.turn_token();
        if token == self.armed {
            return;
        }
        self.armed = token;
        self.deadline = token
            .and(self.table.config().action_timeout())
            .map(|timeout| Instant::now() + timeout);
    }

    /// Fans the table's pending events out to every observer, in order.
    fn publish(&mut self) {
        let envelopes = self.table.drain_events();
        if envelopes.is_empty() {
            return;
        }
        log::debug!("Table {} publishing {} events", self.id, envelopes.len());
        for envelope in &envelopes {
            for observer in &self.observers {
                observer.notify(&envelope.recipients, &envelope.event);
            }
        }
    }

    fn summary(&self) -> TableSummary {
        let table = &self.table;
        let seated = table
            .seated()
            .filter(|p| table.has_player(p.id()))
            .map(|p| (p, false));
        let queued = table.queued().map(|p| (p, true));
        let players = seated
            .chain(queued)
            .map(|(p, queued)| PlayerSummary {
                player_id: p.id(),
                balance: p.balance(),
                last_bet: p.last_bet(),
                folded: p.folded(),
                queued,
            })
            .collect();

        let pot_total = table.pots().iter().map(|p| p.amount).sum::<Chips>()
            + table.seated().map(Player::last_bet).sum::<Chips>();

        TableSummary {
            table_id: self.id,
            config: table.config().clone(),
            current_players: table.current_players(),
            started: table.is_started(),
            round: table.round(),
            hand_count: table.hand_count(),
            small_blind: table.small_blind(),
            current_bet: table.current_bet(),
            pot_total,
            community: table.community().to_vec(),
            dealer: table.dealer(),
            turn: table.turn_player(),
            players,
            created_at: self.created_at,
        }
    }
}
