//! Table manager for spawning and managing multiple table actors.

use super::{
    actor::{TableActor, TableHandle},
    config::TableConfig,
    messages::TableSummary,
};
use crate::{
    game::{
        constants::PAGE_SIZE,
        entities::{PlayerId, TableId},
        errors::{TableError, TableResult},
        events::Observer,
    },
    lobby::TableLifecycle,
};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Live table handles plus their creation order, kept under one lock.
#[derive(Default)]
struct Registry {
    handles: HashMap<TableId, TableHandle>,
    order: Vec<TableId>,
}

/// Table manager for managing multiple table instances
pub struct TableManager {
    /// Active table handles
    tables: Arc<RwLock<Registry>>,

    /// Sinks attached to every table this manager spawns
    observers: Vec<Arc<dyn Observer>>,
}

impl TableManager {
    /// Create a new table manager
    ///
    /// # Arguments
    ///
    /// * `observers` - Event sinks handed to every new table
    ///
    /// # Returns
    ///
    /// * `TableManager` - New table manager instance
    pub fn new(observers: Vec<Arc<dyn Observer>>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(Registry::default())),
            observers,
        }
    }

    /// Create and spawn a new table
    ///
    /// # Arguments
    ///
    /// * `config` - Table configuration
    /// * `creator_id` - Player creating the table, if any
    ///
    /// # Returns
    ///
    /// * `TableResult<TableId>` - Table ID or error
    pub async fn create_table(
        &self,
        config: TableConfig,
        creator_id: Option<PlayerId>,
    ) -> TableResult<TableId> {
        config.validate()?;

        let table_id = Uuid::new_v4();
        let (actor, handle) = TableActor::new(table_id, config, self.observers.clone());

        let mut tables = self.tables.write().await;
        tables.handles.insert(table_id, handle);
        tables.order.push(table_id);
        drop(tables);

        tokio::spawn(async move {
            actor.run().await;
        });

        match creator_id {
            Some(creator) => log::info!("Created table {} for player {}", table_id, creator),
            None => log::info!("Created table {}", table_id),
        }

        Ok(table_id)
    }

    /// Get a table handle
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    ///
    /// # Returns
    ///
    /// * `Option<TableHandle>` - Table handle if found
    pub async fn get_table(&self, table_id: TableId) -> Option<TableHandle> {
        let tables = self.tables.read().await;
        tables.handles.get(&table_id).cloned()
    }

    /// Summaries of one page of tables, oldest first
    ///
    /// # Arguments
    ///
    /// * `page` - Zero-based page index, `PAGE_SIZE` tables per page
    ///
    /// # Returns
    ///
    /// * `Vec<TableSummary>` - Summaries of the tables on that page
    pub async fn list_tables(&self, page: usize) -> Vec<TableSummary> {
        // Copy the handles out so no table is queried under the lock.
        let handles: Vec<TableHandle> = {
            let tables = self.tables.read().await;
            tables
                .order
                .iter()
                .skip(page.saturating_mul(PAGE_SIZE))
                .take(PAGE_SIZE)
                .filter_map(|id| tables.handles.get(id).cloned())
                .collect()
        };

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.summary().await {
                Ok(summary) => summaries.push(summary),
                Err(e) => log::debug!("Skipping table {}: {}", handle.table_id(), e),
            }
        }
        summaries
    }

    /// Every table the player is seated or queued at
    pub async fn tables_with_player(&self, player_id: PlayerId) -> Vec<TableHandle> {
        let handles: Vec<TableHandle> = {
            let tables = self.tables.read().await;
            tables
                .order
                .iter()
                .filter_map(|id| tables.handles.get(id).cloned())
                .collect()
        };

        let mut found = Vec::new();
        for handle in handles {
            if handle.has_player(player_id).await.unwrap_or(false) {
                found.push(handle);
            }
        }
        found
    }

    /// First table the player is seated or queued at
    pub async fn find_by_player(&self, player_id: PlayerId) -> Option<TableHandle> {
        self.tables_with_player(player_id).await.into_iter().next()
    }

    /// Close a table
    ///
    /// # Arguments
    ///
    /// * `table_id` - Table ID
    ///
    /// # Returns
    ///
    /// * `TableResult<()>` - Success or error
    pub async fn close_table(&self, table_id: TableId) -> TableResult<()> {
        let mut tables = self.tables.write().await;
        let handle = tables
            .handles
            .remove(&table_id)
            .ok_or(TableError::TableNotFound(table_id))?;
        tables.order.retain(|id| *id != table_id);
        drop(tables);

        // A table that already stopped has nothing left to close.
        if let Err(e) = handle.close().await {
            log::debug!("Table {} was already gone: {}", table_id, e);
        }

        log::info!("Closed table {}", table_id);

        Ok(())
    }

    /// Get active table count
    pub async fn table_count(&self) -> usize {
        let tables = self.tables.read().await;
        tables.handles.len()
    }
}

#[async_trait]
impl TableLifecycle for TableManager {
    async fn start_table(&self, table_id: TableId) -> TableResult<()> {
        let handle = self
            .get_table(table_id)
            .await
            .ok_or(TableError::TableNotFound(table_id))?;
        handle.start_game().await
    }

    async fn close_table(&self, table_id: TableId) -> TableResult<()> {
        TableManager::close_table(self, table_id).await
    }
}
