//! Server-side session payload

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Data persisted in the session store under a session id
///
/// A session without a `user_id` is anonymous and is never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// Authenticated user, set by a successful login
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl SessionData {
    /// Session data for an authenticated user
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// True when the session carries nothing worth persisting
    pub fn is_anonymous(&self) -> bool {
        self.user_id.is_none()
    }
}
