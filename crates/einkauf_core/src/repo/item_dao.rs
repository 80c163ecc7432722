//! Item DAO contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `item_table` storage.
//! - Publish a fresh snapshot of all items after every successful write.
//!
//! # Invariants
//! - Snapshots are published under the connection lock, so observers see
//!   them in write order.
//! - A committed write reports success even if reloading the snapshot fails.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::config::DuplicatePolicy;
use crate::db::DbError;
use crate::model::item::{Item, ItemId};
use log::{debug, error, warn};
use rusqlite::{params, Connection, ErrorCode, Row};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use tokio::sync::watch;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    name,
    amount,
    price,
    active
FROM item_table";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for item persistence and store operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("item not found: {0}")]
    NotFound(ItemId),
    #[error("item already exists: {0}")]
    Duplicate(ItemId),
    #[error("invalid persisted item data: {0}")]
    InvalidData(String),
    #[error("item connection lock poisoned")]
    LockPoisoned,
    #[error("background task failed: {0}")]
    Background(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract the item store is built on.
pub trait ItemDao: Send + Sync + 'static {
    /// Live view of the full collection, refreshed after every write.
    fn all_items(&self) -> watch::Receiver<Vec<Item>>;
    fn get_all_items(&self) -> RepoResult<Vec<Item>>;
    fn get_item(&self, id: ItemId) -> RepoResult<Item>;
    fn insert(&self, item: &Item) -> RepoResult<()>;
    /// Replaces the whole stored record with `item`.
    fn update(&self, item: &Item) -> RepoResult<()>;
    fn delete(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item DAO.
pub struct SqliteItemDao {
    conn: Mutex<Connection>,
    duplicate_policy: DuplicatePolicy,
    items_tx: watch::Sender<Vec<Item>>,
}

impl SqliteItemDao {
    /// Wraps a migrated connection and loads the initial snapshot.
    pub fn new(conn: Connection, duplicate_policy: DuplicatePolicy) -> RepoResult<Self> {
        let initial = load_all_items(&conn)?;
        let (items_tx, _) = watch::channel(initial);
        Ok(Self {
            conn: Mutex::new(conn),
            duplicate_policy,
            items_tx,
        })
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.duplicate_policy
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }

    /// Republishes the collection after a committed write.
    ///
    /// A failed reload is logged and leaves observers on the previous
    /// snapshot; the write itself has already succeeded.
    fn publish(&self, conn: &Connection, op: &str) {
        match load_all_items(conn) {
            Ok(items) => {
                debug!(
                    "event=items_publish module=repo status=ok op={op} count={} receivers={}",
                    items.len(),
                    self.items_tx.receiver_count()
                );
                self.items_tx.send_replace(items);
            }
            Err(err) => {
                error!(
                    "event=items_publish module=repo status=error op={op} error_code=snapshot_reload_failed error={err}"
                );
            }
        }
    }
}

impl ItemDao for SqliteItemDao {
    fn all_items(&self) -> watch::Receiver<Vec<Item>> {
        self.items_tx.subscribe()
    }

    fn get_all_items(&self) -> RepoResult<Vec<Item>> {
        let conn = self.lock()?;
        load_all_items(&conn)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Item> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_item_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn insert(&self, item: &Item) -> RepoResult<()> {
        let sql = match self.duplicate_policy {
            DuplicatePolicy::Fail => "INSERT",
            DuplicatePolicy::Replace => "INSERT OR REPLACE",
            DuplicatePolicy::Ignore => "INSERT OR IGNORE",
        };

        let conn = self.lock()?;
        let result = conn.execute(
            &format!(
                "{sql} INTO item_table (id, name, amount, price, active)
                 VALUES (?1, ?2, ?3, ?4, ?5);"
            ),
            params![
                item.id,
                item.name.as_deref(),
                i64::from(item.amount),
                item.unit_price_cent,
                bool_to_int(item.active),
            ],
        );

        let changed = match result {
            Ok(changed) => changed,
            Err(err) if is_primary_key_violation(&err) => {
                warn!(
                    "event=item_insert module=repo status=error error_code=duplicate_id id={}",
                    item.id
                );
                return Err(RepoError::Duplicate(item.id));
            }
            Err(err) => return Err(err.into()),
        };

        if changed > 0 {
            self.publish(&conn, "insert");
        }
        Ok(())
    }

    fn update(&self, item: &Item) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE item_table
             SET
                name = ?1,
                amount = ?2,
                price = ?3,
                active = ?4
             WHERE id = ?5;",
            params![
                item.name.as_deref(),
                i64::from(item.amount),
                item.unit_price_cent,
                bool_to_int(item.active),
                item.id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(item.id));
        }

        self.publish(&conn, "update");
        Ok(())
    }

    fn delete(&self, id: ItemId) -> RepoResult<()> {
        let conn = self.lock()?;
        let changed = conn.execute("DELETE FROM item_table WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.publish(&conn, "delete");
        Ok(())
    }
}

fn load_all_items(conn: &Connection) -> RepoResult<Vec<Item>> {
    let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut items = Vec::new();

    while let Some(row) = rows.next()? {
        items.push(parse_item_row(row)?);
    }

    Ok(items)
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let id: ItemId = row.get("id")?;

    let amount_raw: i64 = row.get("amount")?;
    let amount = u32::try_from(amount_raw).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid amount value `{amount_raw}` in item_table.amount for id {id}"
        ))
    })?;

    let active = match row.get::<_, i64>("active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid active value `{other}` in item_table.active for id {id}"
            )));
        }
    };

    Ok(Item {
        id,
        name: row.get("name")?,
        amount,
        unit_price_cent: row.get("price")?,
        active,
    })
}

fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && (failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                    || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_ROWID)
    )
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
