//! User and account response GraphQL types

use async_graphql::{InputObject, Object, SimpleObject};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::User as DbUser;
use crate::services::account::{FieldError as AccountFieldError, UserOutcome};

/// User account exposed via GraphQL
///
/// Wraps the database row so the password hash can never be selected.
pub struct User {
    inner: DbUser,
}

impl User {
    /// Create a new GraphQL User from a database User
    pub fn new(user: DbUser) -> Self {
        Self { inner: user }
    }
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self::new(user)
    }
}

#[Object]
impl User {
    /// Unique user identifier
    async fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Unique login name
    async fn username(&self) -> &str {
        &self.inner.username
    }

    /// Account creation timestamp
    async fn created_at(&self) -> DateTime<Utc> {
        self.inner.created_at
    }

    /// Last update timestamp
    async fn updated_at(&self) -> DateTime<Utc> {
        self.inner.updated_at
    }
}

/// An input problem attached to a field
#[derive(Debug, Clone, SimpleObject)]
pub struct FieldError {
    /// Name of the offending input field
    pub field: String,
    /// What is wrong with it
    pub message: String,
}

impl From<AccountFieldError> for FieldError {
    fn from(error: AccountFieldError) -> Self {
        Self {
            field: error.field,
            message: error.message,
        }
    }
}

/// Result of `register` and `login`
///
/// Fields are set exclusively by `From<UserOutcome>`.
#[derive(SimpleObject)]
pub struct UserResponse {
    pub errors: Option<Vec<FieldError>>,
    pub user: Option<User>,
}

impl From<UserOutcome> for UserResponse {
    fn from(outcome: UserOutcome) -> Self {
        match outcome {
            UserOutcome::Success(user) => Self {
                errors: None,
                user: Some(User::from(user)),
            },
            UserOutcome::Invalid(errors) => Self {
                errors: Some(errors.into_iter().map(FieldError::from).collect()),
                user: None,
            },
            UserOutcome::Conflict(error) => Self {
                errors: Some(vec![FieldError::from(error)]),
                user: None,
            },
        }
    }
}

/// Credentials for `register` and `login`
#[derive(Debug, InputObject)]
pub struct UsernamePasswordInput {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_user() -> DbUser {
        let now = Utc::now();
        DbUser {
            id: Uuid::new_v4(),
            username: "ben".to_string(),
            password: "$argon2id$hash".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_success_has_user_and_no_errors() {
        let response = UserResponse::from(UserOutcome::Success(db_user()));
        assert!(response.errors.is_none());
        assert!(response.user.is_some());
    }

    #[test]
    fn test_conflict_maps_to_single_error() {
        let response = UserResponse::from(UserOutcome::Conflict(AccountFieldError::new(
            "username",
            "username already taken",
        )));
        assert!(response.user.is_none());

        let errors = response.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "username");
        assert_eq!(errors[0].message, "username already taken");
    }
}
