//! Shopping-list store façade.
//!
//! # Responsibility
//! - Provide the item use cases on top of an [`ItemDao`].
//! - Implement targeted field updates as read-modify-write.
//!
//! # Invariants
//! - Every update fetches the current record, replaces only the targeted
//!   field(s) and writes the full record back.
//! - A failed fetch aborts the update with no partial effect.
//! - With `serialize_updates`, updates and deletes of one id never overlap.
//! - Failures propagate unchanged; there is no retry or merge.
//! - The live collection is forwarded as published by the DAO, never
//!   filtered or re-sorted here.

use crate::config::StoreConfig;
use crate::db::{open_db_in_memory, open_db_with};
use crate::model::item::{Item, ItemId};
use crate::repo::item_dao::{ItemDao, RepoError, RepoResult, SqliteItemDao};
use crate::service::subscription::Subscription;
use crate::service::update_guard::UpdateGuard;
use log::{error, info};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Item store built on a shared DAO handle.
pub struct ItemStore<D: ItemDao> {
    dao: Arc<D>,
    guard: Arc<UpdateGuard>,
}

impl<D: ItemDao> Clone for ItemStore<D> {
    fn clone(&self) -> Self {
        Self {
            dao: Arc::clone(&self.dao),
            guard: Arc::clone(&self.guard),
        }
    }
}

impl ItemStore<SqliteItemDao> {
    /// Opens the configured SQLite database and builds a store over it.
    ///
    /// # Side effects
    /// - Creates and migrates the database file when `db_path` is set.
    pub fn open(config: &StoreConfig) -> RepoResult<Self> {
        let conn = match &config.db_path {
            Some(path) => open_db_with(path, config.busy_timeout())?,
            None => open_db_in_memory()?,
        };
        let dao = SqliteItemDao::new(conn, config.duplicate_policy)?;
        info!(
            "event=store_open module=service status=ok duplicate_policy={:?} serialize_updates={}",
            config.duplicate_policy, config.serialize_updates
        );
        Ok(Self::with_guard(dao, UpdateGuard::new(config.serialize_updates)))
    }
}

impl<D: ItemDao> ItemStore<D> {
    /// Creates a store with unguarded updates.
    pub fn new(dao: D) -> Self {
        Self::with_guard(dao, UpdateGuard::disabled())
    }

    pub fn with_guard(dao: D, guard: UpdateGuard) -> Self {
        Self {
            dao: Arc::new(dao),
            guard: Arc::new(guard),
        }
    }

    pub fn dao(&self) -> &D {
        &self.dao
    }

    pub fn guard(&self) -> &UpdateGuard {
        &self.guard
    }

    /// Live view of every stored item.
    pub fn all_items(&self) -> watch::Receiver<Vec<Item>> {
        self.dao.all_items()
    }

    /// Registers `on_change` for the current snapshot and every later change.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, on_change: F) -> RepoResult<Subscription>
    where
        F: FnMut(&[Item]) + Send + 'static,
    {
        let runtime = current_runtime()?;
        Ok(Subscription::spawn(&runtime, self.dao.all_items(), on_change))
    }

    /// Fetches a transient copy of one item.
    pub fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        self.dao.get_item(id)
    }

    /// Persists a new item on the blocking pool and waits for the write.
    pub async fn insert(&self, item: Item) -> RepoResult<()> {
        self.insert_detached(item)?
            .await
            .map_err(|err| RepoError::Background(err.to_string()))?
    }

    /// Starts persisting a new item and returns immediately.
    ///
    /// Dropping the handle does not cancel the write, but nothing guarantees
    /// the write has finished when this returns.
    pub fn insert_detached(&self, item: Item) -> RepoResult<JoinHandle<RepoResult<()>>> {
        let runtime = current_runtime()?;
        let dao = Arc::clone(&self.dao);
        Ok(runtime.spawn_blocking(move || {
            let started_at = Instant::now();
            let result = dao.insert(&item);
            log_write("insert", item.id, started_at, &result);
            result
        }))
    }

    pub fn update_amount(&self, id: ItemId, amount: u32) -> RepoResult<()> {
        self.read_modify_write("update_amount", id, |current| current.with_amount(amount))
    }

    pub fn update_active(&self, id: ItemId, active: bool) -> RepoResult<()> {
        self.read_modify_write("update_active", id, |current| current.with_active(active))
    }

    /// Replaces name and unit price as one write; amount and flag are kept.
    pub fn update_name_and_price(
        &self,
        id: ItemId,
        name: impl Into<String>,
        unit_price_cent: i64,
    ) -> RepoResult<()> {
        let name = name.into();
        self.read_modify_write("update_name_and_price", id, move |current| {
            current.with_name_and_price(name, unit_price_cent)
        })
    }

    /// Removes an item permanently. Fails with `NotFound` when absent.
    pub fn delete(&self, id: ItemId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.guard.run(id, || self.dao.delete(id));
        log_write("delete", id, started_at, &result);
        result
    }

    fn read_modify_write(
        &self,
        op: &'static str,
        id: ItemId,
        change: impl FnOnce(Item) -> Item,
    ) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.guard.run(id, || {
            let current = self.dao.get_item(id)?;
            self.dao.update(&change(current))
        });
        log_write(op, id, started_at, &result);
        result
    }
}

fn current_runtime() -> RepoResult<Handle> {
    Handle::try_current().map_err(|err| RepoError::Background(err.to_string()))
}

fn log_write(op: &str, id: ItemId, started_at: Instant, result: &RepoResult<()>) {
    match result {
        Ok(()) => info!(
            "event=item_write module=service status=ok op={op} id={id} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=item_write module=service status=error op={op} id={id} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
