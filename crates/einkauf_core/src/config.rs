//! Store configuration.
//!
//! # Responsibility
//! - Describe where items are persisted and how writes behave.
//! - Resolve the duplicate-insert choice explicitly instead of leaving it to
//!   the backend.
//!
//! # Invariants
//! - `db_path = None` means a private in-memory database.
//! - Every field has a default so partial documents deserialize.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// What `insert` does when the item id is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Reject the insert with `RepoError::Duplicate`.
    #[default]
    Fail,
    /// Overwrite the stored record.
    Replace,
    /// Keep the stored record and report success.
    Ignore,
}

/// Configuration consumed by `ItemStore::open`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub db_path: Option<PathBuf>,
    pub duplicate_policy: DuplicatePolicy,
    /// Hold a per-id lock across each read-modify-write update.
    pub serialize_updates: bool,
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            duplicate_policy: DuplicatePolicy::Fail,
            serialize_updates: false,
            busy_timeout_ms: 5_000,
        }
    }
}

impl StoreConfig {
    /// In-memory configuration with defaults.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// File-backed configuration with defaults.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}
