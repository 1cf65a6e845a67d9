//! PostgreSQL-backed order repository.

use async_trait::async_trait;
use common::{Money, OrderNo, ProductId, UserId};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::OrderError;
use super::model::{NewOrder, Order, PaymentType};
use super::repository::OrderRepository;
use super::state::OrderStatus;
use crate::error::DomainError;

/// PostgreSQL order repository.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: PgRow) -> Result<Order, DomainError> {
        Ok(Order {
            id: row.try_get("id").map_err(DomainError::Storage)?,
            order_no: OrderNo::new(
                row.try_get::<String, _>("order_no")
                    .map_err(DomainError::Storage)?,
            ),
            user_id: UserId::from_uuid(
                row.try_get::<Uuid, _>("user_id")
                    .map_err(DomainError::Storage)?,
            ),
            product_id: ProductId::new(row.try_get("product_id").map_err(DomainError::Storage)?),
            amount: Money::from_cents(row.try_get("amount_cents").map_err(DomainError::Storage)?),
            payment_type: PaymentType::from_i16(
                row.try_get("payment_type").map_err(DomainError::Storage)?,
            ),
            status: OrderStatus::from_i16(row.try_get("status").map_err(DomainError::Storage)?),
            created_at: row.try_get("created_at").map_err(DomainError::Storage)?,
        })
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn insert(&self, new: NewOrder) -> Result<Order, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO orders (order_no, user_id, product_id, amount_cents, payment_type, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, order_no, user_id, product_id, amount_cents, payment_type, status, created_at
            "#,
        )
        .bind(new.order_no.as_str())
        .bind(new.user_id.as_uuid())
        .bind(new.product_id.as_i64())
        .bind(new.amount.cents())
        .bind(new.payment_type.as_i16())
        .bind(new.status.as_i16())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_no_key")
            {
                return DomainError::Order(OrderError::DuplicateOrderNo {
                    order_no: new.order_no.to_string(),
                });
            }
            DomainError::Storage(e)
        })?;

        Self::row_to_order(row)
    }

    async fn update(&self, order: Order) -> Result<Order, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET user_id = $2, product_id = $3, amount_cents = $4, payment_type = $5, status = $6
            WHERE order_no = $1
            "#,
        )
        .bind(order.order_no.as_str())
        .bind(order.user_id.as_uuid())
        .bind(order.product_id.as_i64())
        .bind(order.amount.cents())
        .bind(order.payment_type.as_i16())
        .bind(order.status.as_i16())
        .execute(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        if result.rows_affected() == 0 {
            return Err(OrderError::NotFound {
                order_no: order.order_no.to_string(),
            }
            .into());
        }
        Ok(order)
    }

    async fn set_status(
        &self,
        order_no: &OrderNo,
        status: OrderStatus,
    ) -> Result<Order, DomainError> {
        let row = sqlx::query(
            r#"
            UPDATE orders SET status = $2
            WHERE order_no = $1
            RETURNING id, order_no, user_id, product_id, amount_cents, payment_type, status, created_at
            "#,
        )
        .bind(order_no.as_str())
        .bind(status.as_i16())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        match row {
            Some(row) => Self::row_to_order(row),
            None => Err(OrderError::NotFound {
                order_no: order_no.to_string(),
            }
            .into()),
        }
    }

    async fn find_by_order_no(&self, order_no: &OrderNo) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, order_no, user_id, product_id, amount_cents, payment_type, status, created_at
            FROM orders
            WHERE order_no = $1
            "#,
        )
        .bind(order_no.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        row.map(Self::row_to_order).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, order_no, user_id, product_id, amount_cents, payment_type, status, created_at
            FROM orders
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        rows.into_iter().map(Self::row_to_order).collect()
    }
}
