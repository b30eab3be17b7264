//! Session store for cookie-keyed server-side sessions
//!
//! Sessions are JSON documents stored in Redis under `{prefix}{session_id}`
//! with a TTL matching the cookie lifetime.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::models::SessionData;

/// Persistence for session payloads keyed by session id
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a live session, `None` if unknown or expired
    async fn load(&self, session_id: &str) -> ApiResult<Option<SessionData>>;

    /// Create or overwrite a session with a fresh TTL
    async fn save(&self, session_id: &str, data: &SessionData, ttl_secs: u64) -> ApiResult<()>;

    /// Remove a session; removing an unknown id is not an error
    async fn destroy(&self, session_id: &str) -> ApiResult<()>;

    /// Connectivity check used by the readiness probe
    async fn ping(&self) -> ApiResult<()>;
}

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    key_prefix: String,
}

impl RedisSessionStore {
    /// Create a new store using the given client and key prefix
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.key_prefix, session_id)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, session_id: &str) -> ApiResult<Option<SessionData>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let raw: Option<String> = redis::cmd("GET")
            .arg(self.key(session_id))
            .query_async(&mut conn)
            .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(data) => Ok(Some(data)),
            Err(e) => {
                // Unreadable payloads are treated as absent so the client
                // falls back to an anonymous session.
                tracing::warn!(error = %e, "Discarding malformed session payload");
                Ok(None)
            }
        }
    }

    async fn save(&self, session_id: &str, data: &SessionData, ttl_secs: u64) -> ApiResult<()> {
        let payload = serde_json::to_string(data)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(self.key(session_id))
            .arg(payload)
            .arg("EX")
            .arg(ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn destroy(&self, session_id: &str) -> ApiResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("DEL")
            .arg(self.key(session_id))
            .query_async::<_, i64>(&mut conn)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> ApiResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await?;

        Ok(())
    }
}
