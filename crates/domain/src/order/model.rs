//! Order entity.

use chrono::{DateTime, Utc};
use common::{Money, OrderNo, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::state::OrderStatus;

/// How an order is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Undefined,
    Wechat,
    Alipay,
}

impl PaymentType {
    /// Returns the numeric code stored in the database.
    pub fn as_i16(&self) -> i16 {
        match self {
            PaymentType::Undefined => 0,
            PaymentType::Wechat => 1,
            PaymentType::Alipay => 2,
        }
    }

    /// Decodes a database code, falling back to `Undefined`.
    pub fn from_i16(code: i16) -> Self {
        match code {
            1 => PaymentType::Wechat,
            2 => PaymentType::Alipay,
            _ => PaymentType::Undefined,
        }
    }
}

/// An order record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Assigned row identifier.
    pub id: i64,
    /// Unique business key.
    pub order_no: OrderNo,
    /// The user who placed the order.
    pub user_id: UserId,
    /// The ordered product.
    pub product_id: ProductId,
    /// Order total.
    pub amount: Money,
    /// Payment method.
    pub payment_type: PaymentType,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting an order; the repository assigns the row ID.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_no: OrderNo,
    pub user_id: UserId,
    pub product_id: ProductId,
    pub amount: Money,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
}
