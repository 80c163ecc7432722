//! Shopping-list domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted by the item store.
//!
//! # Invariants
//! - Every record is identified by a caller-assigned `ItemId`.
//! - Deletion is permanent; there are no tombstones.

pub mod item;
