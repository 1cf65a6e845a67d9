//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use common::UserId;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use super::UserError;
use super::model::User;
use super::repository::UserRepository;
use crate::error::DomainError;

/// PostgreSQL user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgreSQL user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: PgRow) -> Result<User, DomainError> {
        Ok(User {
            id: UserId::from_uuid(row.try_get::<Uuid, _>("id").map_err(DomainError::Storage)?),
            username: row.try_get("username").map_err(DomainError::Storage)?,
            password_hash: row.try_get("password_hash").map_err(DomainError::Storage)?,
            created_at: row.try_get("created_at").map_err(DomainError::Storage)?,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: User) -> Result<User, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("users_username_key")
            {
                return DomainError::User(UserError::UsernameExists {
                    username: user.username.clone(),
                });
            }
            DomainError::Storage(e)
        })?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(
            "SELECT id, username, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DomainError::Storage)?;

        row.map(Self::row_to_user).transpose()
    }
}
