//! Item domain model.
//!
//! # Responsibility
//! - Define the shopping-list entry shared by storage and observers.
//! - Provide copy-with-overrides helpers used by read-modify-write updates.
//!
//! # Invariants
//! - `id` is assigned by the caller and never reused for another item.
//! - `name` is the only optional field.
//! - Overriding one field never touches the others.

use serde::{Deserialize, Serialize};

/// Caller-assigned identifier of a shopping-list entry.
pub type ItemId = i64;

/// One shopping-list entry.
///
/// Values returned by the store are transient copies; they do not follow
/// later writes to the stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Stable identity, unique within one store.
    pub id: ItemId,
    /// Free-text label. May be unset.
    pub name: Option<String>,
    /// Quantity to buy.
    #[serde(default)]
    pub amount: u32,
    /// Price of a single unit in minor currency units.
    #[serde(default)]
    pub unit_price_cent: i64,
    /// `true` while the entry is still on the list.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Item {
    /// Creates an item with zero amount, zero price and `active = true`.
    pub fn new(id: ItemId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            amount: 0,
            unit_price_cent: 0,
            active: true,
        }
    }

    /// Creates a named item with the given amount and unit price.
    pub fn named(id: ItemId, name: impl Into<String>, amount: u32, unit_price_cent: i64) -> Self {
        Self {
            amount,
            unit_price_cent,
            ..Self::new(id, Some(name.into()))
        }
    }

    pub fn with_amount(self, amount: u32) -> Self {
        Self { amount, ..self }
    }

    pub fn with_active(self, active: bool) -> Self {
        Self { active, ..self }
    }

    /// Replaces `name` and `unit_price_cent` together.
    pub fn with_name_and_price(self, name: impl Into<String>, unit_price_cent: i64) -> Self {
        Self {
            name: Some(name.into()),
            unit_price_cent,
            ..self
        }
    }
}
