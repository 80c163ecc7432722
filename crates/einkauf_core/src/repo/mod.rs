//! Persistence layer for shopping-list items.
//!
//! # Responsibility
//! - Define the data access contract the item store delegates to.
//! - Isolate SQLite query details from the store façade.
//!
//! # Invariants
//! - Writes are full-record operations keyed by `ItemId`.
//! - APIs return semantic errors (`NotFound`, `Duplicate`) in addition to DB
//!   transport errors.

pub mod item_dao;
