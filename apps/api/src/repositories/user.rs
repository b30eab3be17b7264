//! User repository for centralized database operations
//!
//! All user queries live here, behind the `UserStore` trait.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::User;

/// Data-access handle for user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by their unique ID
    async fn find_by_id(&self, user_id: Uuid) -> ApiResult<Option<User>>;

    /// Find a user by their exact username
    async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>>;

    /// Insert a new user and return the stored row
    ///
    /// # Errors
    /// - `ApiError::Conflict` if the username is already taken
    /// - any other variant for unclassified storage failures
    async fn create(&self, username: &str, password_hash: &str) -> ApiResult<User>;
}

/// Postgres-backed user store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new UserRepository instance
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, user_id: Uuid) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, username: &str, password_hash: &str) -> ApiResult<User> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            RETURNING id, username, password, created_at, updated_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                ApiError::conflict("username", username)
            }
            _ => ApiError::Database(e),
        })
    }
}
