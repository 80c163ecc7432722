//! Store façade over the item DAO.
//!
//! # Responsibility
//! - Expose the shopping-list use cases (insert, targeted updates, delete,
//!   observation) to callers.
//! - Keep callers decoupled from storage details.

pub mod item_store;
pub mod subscription;
pub mod update_guard;
