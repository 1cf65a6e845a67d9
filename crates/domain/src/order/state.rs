//! Order status machine.

use serde::{Deserialize, Serialize};

/// The status of an order record.
///
/// Status transitions are append-only:
/// ```text
/// Undefined ──► Normal ──► Deleted
/// ```
/// A deleted order is never resurrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placeholder before the record is committed.
    #[default]
    Undefined,

    /// Live order.
    Normal,

    /// Soft-deleted order (terminal status).
    Deleted,
}

impl OrderStatus {
    /// Returns true if the order can be updated in this status.
    pub fn can_update(&self) -> bool {
        matches!(self, OrderStatus::Normal)
    }

    /// Returns true if the order can be marked deleted in this status.
    pub fn can_delete(&self) -> bool {
        matches!(self, OrderStatus::Normal)
    }

    /// Returns true if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Deleted)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Undefined => "Undefined",
            OrderStatus::Normal => "Normal",
            OrderStatus::Deleted => "Deleted",
        }
    }

    /// Returns the numeric code stored in the database.
    pub fn as_i16(&self) -> i16 {
        match self {
            OrderStatus::Undefined => 0,
            OrderStatus::Normal => 1,
            OrderStatus::Deleted => 2,
        }
    }

    /// Decodes a database code, falling back to `Undefined`.
    pub fn from_i16(code: i16) -> Self {
        match code {
            1 => OrderStatus::Normal,
            2 => OrderStatus::Deleted,
            _ => OrderStatus::Undefined,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
