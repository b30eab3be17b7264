//! Cookie-keyed server-side sessions
//!
//! A request's session is loaded from the store named by the session cookie
//! before GraphQL execution and committed afterwards:
//! - sessions are only persisted once they carry a `user_id`
//! - a session whose user changed gets a fresh id (no fixation)
//! - a persisted session that lost its `user_id` is purged and its cookie cleared
//! - destroyed sessions are left alone; `logout` already cleared the cookie

use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use agora_shared_config::SessionConfig;
use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use cookie::{Cookie, SameSite};
use uuid::Uuid;

use super::cookies::{read_cookie, ResponseCookies};
use crate::error::ApiResult;
use crate::models::SessionData;
use crate::repositories::SessionStore;

#[derive(Debug, Default)]
struct SessionState {
    id: Option<String>,
    data: SessionData,
    changed: bool,
    rotate: bool,
    destroyed: bool,
}

/// Request-scoped session handle
///
/// Cloning shares the same underlying state, so the resolver and the
/// commit step observe the same session.
#[derive(Clone)]
pub struct Session {
    state: Arc<Mutex<SessionState>>,
    store: Arc<dyn SessionStore>,
}

impl Session {
    /// A session loaded from the store under `id`
    pub fn existing(store: Arc<dyn SessionStore>, id: String, data: SessionData) -> Self {
        Self::with_state(
            store,
            SessionState {
                id: Some(id),
                data,
                ..SessionState::default()
            },
        )
    }

    /// A fresh, unsaved anonymous session
    pub fn anonymous(store: Arc<dyn SessionStore>) -> Self {
        Self::with_state(store, SessionState::default())
    }

    fn with_state(store: Arc<dyn SessionStore>, state: SessionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            store,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Session id, `None` until the session has been persisted
    pub fn id(&self) -> Option<String> {
        self.lock().id.clone()
    }

    /// Authenticated user of this session
    pub fn user_id(&self) -> Option<Uuid> {
        self.lock().data.user_id
    }

    /// Mark the session as authenticated for `user_id`
    pub fn set_user_id(&self, user_id: Uuid) {
        let mut state = self.lock();
        if state.destroyed {
            // Start over as a fresh session; the old id is gone from the store
            *state = SessionState {
                data: SessionData::for_user(user_id),
                changed: true,
                ..SessionState::default()
            };
            return;
        }

        if state.data.user_id != Some(user_id) {
            state.rotate = state.id.is_some();
            state.data.user_id = Some(user_id);
            state.changed = true;
        }
    }

    /// Drop the authenticated user from the session
    pub fn clear_user_id(&self) {
        let mut state = self.lock();
        if state.data.user_id.take().is_some() {
            state.changed = true;
        }
    }

    /// True once `destroy` has succeeded
    pub fn is_destroyed(&self) -> bool {
        self.lock().destroyed
    }

    /// Remove the session from the store
    ///
    /// On failure the in-memory state is left untouched.
    pub async fn destroy(&self) -> ApiResult<()> {
        let id = self.id();
        if let Some(id) = id.as_deref() {
            self.store.destroy(id).await?;
        }

        let mut state = self.lock();
        state.data = SessionData::default();
        state.changed = false;
        state.rotate = false;
        state.destroyed = true;
        Ok(())
    }

    fn snapshot(&self) -> SessionSnapshot {
        let state = self.lock();
        SessionSnapshot {
            id: state.id.clone(),
            data: state.data.clone(),
            changed: state.changed,
            rotate: state.rotate,
            destroyed: state.destroyed,
        }
    }
}

struct SessionSnapshot {
    id: Option<String>,
    data: SessionData,
    changed: bool,
    rotate: bool,
    destroyed: bool,
}

/// Loads and commits request sessions against a `SessionStore`
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
    secure_cookies: bool,
}

impl SessionManager {
    /// Create a new manager
    ///
    /// `secure_cookies` marks the session cookie `Secure`; enable it when
    /// the API is served over HTTPS.
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig, secure_cookies: bool) -> Self {
        Self {
            store,
            config,
            secure_cookies,
        }
    }

    /// Name of the session cookie
    pub fn cookie_name(&self) -> &str {
        &self.config.cookie_name
    }

    /// The underlying session store
    pub fn store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.store)
    }

    /// Resolve the session named by the request's session cookie
    ///
    /// Unknown, expired or unreadable sessions yield an anonymous session;
    /// store failures are logged rather than failing the request.
    pub async fn load(&self, headers: &HeaderMap) -> Session {
        let Some(id) = read_cookie(headers, &self.config.cookie_name) else {
            return Session::anonymous(self.store());
        };

        match self.store.load(&id).await {
            Ok(Some(data)) => Session::existing(self.store(), id, data),
            Ok(None) => {
                tracing::debug!("Session cookie refers to an unknown or expired session");
                Session::anonymous(self.store())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session store unavailable, continuing anonymously");
                Session::anonymous(self.store())
            }
        }
    }

    /// Persist session changes and queue the matching cookies
    pub async fn commit(&self, session: &Session, cookies: &ResponseCookies) -> ApiResult<()> {
        let snapshot = session.snapshot();
        if snapshot.destroyed || !snapshot.changed {
            return Ok(());
        }

        if snapshot.data.is_anonymous() {
            if let Some(id) = snapshot.id.as_deref() {
                self.store.destroy(id).await?;
                cookies.clear(&self.config.cookie_name);
                tracing::debug!("Purged session without a user");
            }
            return Ok(());
        }

        let id = match snapshot.id {
            Some(old_id) if snapshot.rotate => {
                if let Err(e) = self.store.destroy(&old_id).await {
                    tracing::warn!(error = %e, "Failed to remove rotated session");
                }
                new_session_id()
            }
            Some(id) => id,
            None => new_session_id(),
        };

        self.store
            .save(&id, &snapshot.data, self.config.ttl_secs)
            .await?;
        cookies.add(self.session_cookie(id));

        Ok(())
    }

    fn session_cookie(&self, id: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.config.ttl_secs).unwrap_or(i64::MAX);
        Cookie::build((self.config.cookie_name.clone(), id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .max_age(cookie::time::Duration::seconds(max_age))
            .build()
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Extractor yielding the request's session
///
/// Never rejects: failures degrade to an anonymous session.
pub struct RequestSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for RequestSession
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let manager = SessionManager::from_ref(state);
        Ok(Self(manager.load(&parts.headers).await))
    }
}
