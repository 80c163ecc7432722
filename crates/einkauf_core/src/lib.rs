//! Core data layer for the einkauf shopping list.
//! Owns the item record, its SQLite persistence and the observable store.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{DuplicatePolicy, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig};
pub use model::item::{Item, ItemId};
pub use repo::item_dao::{ItemDao, RepoError, RepoResult, SqliteItemDao};
pub use service::item_store::ItemStore;
pub use service::subscription::Subscription;
pub use service::update_guard::UpdateGuard;

/// Minimal health-check API for linkage probes.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
