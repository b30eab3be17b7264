//! In-memory stores
//!
//! Process-local implementations of `UserStore` and `SessionStore`. The
//! session store doubles as the development fallback when Redis cannot be
//! reached; it provides per-instance sessions only.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::session::SessionStore;
use super::user::UserStore;
use crate::error::{ApiError, ApiResult};
use crate::models::{SessionData, User};

/// In-memory user store enforcing username uniqueness
#[derive(Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Delete a user, returning whether it existed
    pub async fn remove(&self, user_id: Uuid) -> bool {
        self.users.write().await.remove(&user_id).is_some()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// True if no users are stored
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, user_id: Uuid) -> ApiResult<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> ApiResult<User> {
        // Check and insert under one write lock, mirroring a unique index
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == username) {
            return Err(ApiError::conflict("username", username));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }
}

struct SessionEntry {
    data: SessionData,
    expires_at: Instant,
}

/// In-memory session store with TTL expiry
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, SessionEntry>>>,
}

impl InMemorySessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// True if no live sessions are stored
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drop expired entries
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);

        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!(
                removed = removed,
                remaining = entries.len(),
                "Cleaned up expired sessions"
            );
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: &str) -> ApiResult<Option<SessionData>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(session_id)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.data.clone()))
    }

    async fn save(&self, session_id: &str, data: &SessionData, ttl_secs: u64) -> ApiResult<()> {
        let entry = SessionEntry {
            data: data.clone(),
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.entries
            .write()
            .await
            .insert(session_id.to_string(), entry);

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> ApiResult<()> {
        self.entries.write().await.remove(session_id);
        Ok(())
    }

    async fn ping(&self) -> ApiResult<()> {
        Ok(())
    }
}
