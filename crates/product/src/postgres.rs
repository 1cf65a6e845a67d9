//! PostgreSQL-backed product store.

use async_trait::async_trait;
use common::{Money, ProductId};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::error::ProductError;
use crate::model::{NewProduct, Product};
use crate::repository::ProductRepository;
use crate::stock::{StockRequest, StockService};

/// PostgreSQL product store.
///
/// Idempotency markers live in the `stock_mutations` table: the insert with
/// `ON CONFLICT DO NOTHING` decides whether a decrement is a replay, and the
/// conditional `reverted` flip decides whether a revert credits stock.
#[derive(Clone)]
pub struct PostgresProductStore {
    pool: PgPool,
}

impl PostgresProductStore {
    /// Creates a new PostgreSQL product store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_product(row: PgRow) -> Result<Product, ProductError> {
        Ok(Product {
            id: ProductId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            price: Money::from_cents(row.try_get("price_cents")?),
            stock: row.try_get::<i32, _>("stock")? as u32,
        })
    }
}

#[async_trait]
impl ProductRepository for PostgresProductStore {
    async fn create(&self, new: NewProduct) -> Result<Product, ProductError> {
        let row = sqlx::query(
            r#"
            INSERT INTO products (name, price_cents, stock)
            VALUES ($1, $2, $3)
            RETURNING id, name, price_cents, stock
            "#,
        )
        .bind(&new.name)
        .bind(new.price.cents())
        .bind(new.stock as i32)
        .fetch_one(&self.pool)
        .await?;

        Self::row_to_product(row)
    }

    async fn update(&self, product: Product) -> Result<Product, ProductError> {
        let result = sqlx::query(
            r#"
            UPDATE products SET name = $2, price_cents = $3, stock = $4
            WHERE id = $1
            "#,
        )
        .bind(product.id.as_i64())
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(product.stock as i32)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ProductError::NotFound(product.id));
        }
        Ok(product)
    }

    async fn delete(&self, id: ProductId) -> Result<(), ProductError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_i64())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(ProductError::NotFound(id));
        }
        Ok(())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, ProductError> {
        let row = sqlx::query("SELECT id, name, price_cents, stock FROM products WHERE id = $1")
            .bind(id.as_i64())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, ProductError> {
        let rows = sqlx::query("SELECT id, name, price_cents, stock FROM products ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_product).collect()
    }
}

#[async_trait]
impl StockService for PostgresProductStore {
    #[tracing::instrument(skip(self))]
    async fn decrease_stock(&self, req: StockRequest) -> Result<(), ProductError> {
        let mut tx = self.pool.begin().await?;

        let marker = sqlx::query(
            r#"
            INSERT INTO stock_mutations (order_no, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (order_no) DO NOTHING
            "#,
        )
        .bind(req.order_no.as_str())
        .bind(req.product_id.as_i64())
        .bind(req.quantity as i32)
        .execute(&mut *tx)
        .await?;

        // Replay of an already-applied decrement.
        if marker.rows_affected() == 0 {
            tx.commit().await?;
            return Ok(());
        }

        let updated = sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
            .bind(req.product_id.as_i64())
            .bind(req.quantity as i32)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            let stock: Option<i32> = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
                .bind(req.product_id.as_i64())
                .fetch_optional(&mut *tx)
                .await?;

            // Dropping the transaction rolls the marker back.
            return match stock {
                None => Err(ProductError::NotFound(req.product_id)),
                Some(available) => Err(ProductError::InsufficientStock {
                    product_id: req.product_id,
                    requested: req.quantity,
                    available: available as u32,
                }),
            };
        }

        tx.commit().await?;
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn decrease_stock_revert(&self, req: StockRequest) -> Result<(), ProductError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE stock_mutations SET reverted = TRUE
            WHERE order_no = $1 AND reverted = FALSE
            RETURNING product_id, quantity
            "#,
        )
        .bind(req.order_no.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        // Nothing to credit: never applied, or already reverted.
        let Some(row) = row else {
            tx.commit().await?;
            return Ok(());
        };

        let product_id: i64 = row.try_get("product_id")?;
        let quantity: i32 = row.try_get("quantity")?;

        sqlx::query("UPDATE products SET stock = stock + $2 WHERE id = $1")
            .bind(product_id)
            .bind(quantity)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
