//! User account model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User account from the users table
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    /// Unique user identifier (generated by the database)
    pub id: Uuid,

    /// Login name (unique)
    pub username: String,

    /// Argon2 password hash in PHC string format
    #[serde(skip_serializing)]
    pub password: String,

    /// Account creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}
