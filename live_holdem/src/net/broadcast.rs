use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};
use tokio::sync::mpsc;

use crate::game::{
    entities::PlayerId,
    events::{Observer, TableEvent},
};

/// Events buffered per session before new ones are dropped.
pub const SESSION_CAPACITY: usize = 256;

/// Routes table events to the sessions of their recipients.
pub struct SessionHub {
    sessions: RwLock<HashMap<PlayerId, mpsc::Sender<TableEvent>>>,
    capacity: usize,
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(SESSION_CAPACITY)
    }
}

impl SessionHub {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Opens a session for the player, replacing any previous one.
    pub fn subscribe(&self, player_id: PlayerId) -> mpsc::Receiver<TableEvent> {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        if sessions.insert(player_id, sender).is_some() {
            log::debug!("Player {} reconnected, old session replaced", player_id);
        }
        receiver
    }

    pub fn unsubscribe(&self, player_id: PlayerId) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(&player_id).is_some()
    }

    #[must_use]
    pub fn is_connected(&self, player_id: PlayerId) -> bool {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions.contains_key(&player_id)
    }
}

impl Observer for SessionHub {
    fn notify(&self, recipients: &[PlayerId], event: &TableEvent) {
        let mut closed = Vec::new();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            for player_id in recipients {
                let Some(sender) = sessions.get(player_id) else {
                    continue;
                };
                match sender.try_send(event.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!(
                            "Session {} channel full, dropping {}",
                            player_id,
                            event.event_type()
                        );
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*player_id),
                }
            }
        }

        if !closed.is_empty() {
            let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
            for player_id in closed {
                // Only prune if the session was not replaced in the meantime.
                if sessions.get(&player_id).is_some_and(mpsc::Sender::is_closed) {
                    log::debug!("Session {} disconnected, removing", player_id);
                    sessions.remove(&player_id);
                }
            }
        }
    }
}
