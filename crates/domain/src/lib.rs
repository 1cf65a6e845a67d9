//! Domain layer for the commerce services.
//!
//! This crate provides the order and user entities with their state
//! machines, repository contracts (in-memory and PostgreSQL), and the
//! services wrapping them.

pub mod error;
pub mod order;
pub mod user;

pub use error::DomainError;
pub use order::{
    CreateOrder, InMemoryOrderRepository, NewOrder, Order, OrderError, OrderRepository,
    OrderService, OrderStatus, PaymentType, PostgresOrderRepository, UpdateOrder,
};
pub use user::{
    InMemoryUserRepository, LoginResult, PostgresUserRepository, User, UserDetail, UserError,
    UserRepository, UserService,
};

/// Runs the workspace database migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
