//! Error handling for the Agora API
//!
//! This module provides a unified error type using thiserror, with HTTP
//! status code mapping used to pick the log severity. Account operations
//! report expected failures (validation, bad credentials) in-band as field
//! errors; `ApiError` covers conflicts and everything that is a real fault.

use axum::http::StatusCode;
use thiserror::Error;

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Resource Errors ==========
    /// Unique value already taken (e.g. a duplicate username)
    #[error("{resource_type} already exists: {id}")]
    Conflict {
        resource_type: &'static str,
        id: String,
    },

    // ========== Storage Errors ==========
    /// Database query failed
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Redis operation failed
    #[error("session store error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Session store failure not backed by Redis
    #[error("session error: {0}")]
    Session(String),

    // ========== Internal Errors ==========
    /// Password hashing or verification failed
    #[error("password hashing error: {0}")]
    PasswordHash(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Serialization(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Redis(_) | Self::Session(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Database(_) | Self::PasswordHash(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "SESSION_STORE_ERROR",
            Self::Session(_) => "SESSION_ERROR",
            Self::PasswordHash(_) => "PASSWORD_HASH_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Create a conflict error for a specific resource
    pub fn conflict(resource_type: &'static str, id: impl Into<String>) -> Self {
        Self::Conflict {
            resource_type,
            id: id.into(),
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::conflict("username", "ben").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Session("destroy failed".to_string()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::PasswordHash("bad salt".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::conflict("username", "ben").error_code(), "CONFLICT");
        assert_eq!(
            ApiError::Internal("boom".to_string()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::conflict("username", "ben");
        assert_eq!(err.to_string(), "username already exists: ben");
    }
}
