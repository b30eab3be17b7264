//! Common test utilities for API integration tests
//!
//! Builds the GraphQL router on in-memory stores and drives it with a small
//! cookie-carrying client, so account flows run without Postgres or Redis.

#![allow(dead_code)]

use std::sync::Arc;

use agora_api::{
    build_schema,
    middleware::SessionManager,
    repositories::{InMemorySessionStore, InMemoryUserStore, SessionStore, UserStore},
    routes::{graphql_router, GraphQLState},
    AccountService, PasswordService,
};
use agora_shared_config::SessionConfig;
use argon2::Params;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cookie::Cookie;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const ME: &str = "{ me { id username createdAt updatedAt } }";

pub const REGISTER: &str = r#"
    mutation Register($username: String!, $password: String!) {
        register(options: { username: $username, password: $password }) {
            errors { field message }
            user { id username createdAt updatedAt }
        }
    }
"#;

pub const LOGIN: &str = r#"
    mutation Login($username: String!, $password: String!) {
        login(options: { username: $username, password: $password }) {
            errors { field message }
            user { id username }
        }
    }
"#;

pub const LOGOUT: &str = "mutation { logout }";

/// Cheap Argon2 parameters so tests don't spend seconds hashing
pub fn fast_passwords() -> PasswordService {
    PasswordService::with_params(Params::new(8, 1, 1, None).unwrap())
}

/// Router plus handles on its in-memory stores
pub struct TestApp {
    pub router: Router,
    pub users: InMemoryUserStore,
    pub sessions: InMemorySessionStore,
}

impl TestApp {
    pub fn new() -> Self {
        let users = InMemoryUserStore::new();
        let sessions = InMemorySessionStore::new();
        let router = build_router(Arc::new(users.clone()), Arc::new(sessions.clone()));

        Self {
            router,
            users,
            sessions,
        }
    }

    pub fn client(&self) -> TestClient {
        TestClient::new(self.router.clone())
    }
}

/// Mount the GraphQL routes at `/graphql` over the given stores
pub fn build_router(users: Arc<dyn UserStore>, sessions: Arc<dyn SessionStore>) -> Router {
    let manager = SessionManager::new(sessions, SessionConfig::default(), false);
    let schema = build_schema(AccountService::new(fast_passwords(), manager.cookie_name()));

    Router::new().nest(
        "/graphql",
        graphql_router(GraphQLState::new(schema, manager, users)),
    )
}

/// A GraphQL response as seen by a client
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub set_cookies: Vec<Cookie<'static>>,
}

impl Reply {
    /// The `data.<field>` value
    pub fn data(&self, field: &str) -> &Value {
        &self.body["data"][field]
    }

    /// The cookie named `name` set by this response, if any
    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.set_cookies.iter().find(|c| c.name() == name)
    }
}

/// Minimal client that remembers the `qid` cookie like a browser would
pub struct TestClient {
    router: Router,
    session_cookie: Option<String>,
}

impl TestClient {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            session_cookie: None,
        }
    }

    /// Current value of the session cookie in the jar
    pub fn session_cookie(&self) -> Option<&str> {
        self.session_cookie.as_deref()
    }

    /// Put a cookie in the jar by hand
    pub fn set_session_cookie(&mut self, value: impl Into<String>) {
        self.session_cookie = Some(value.into());
    }

    pub async fn execute(&mut self, query: &str, variables: Value) -> Reply {
        let mut request = Request::builder()
            .method("POST")
            .uri("/graphql")
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(value) = &self.session_cookie {
            request = request.header(header::COOKIE, format!("qid={}", value));
        }

        let body = json!({ "query": query, "variables": variables });
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let set_cookies: Vec<Cookie<'static>> = response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
            .collect();

        if let Some(cookie) = set_cookies.iter().find(|c| c.name() == "qid") {
            self.session_cookie = if cookie.value().is_empty() {
                None
            } else {
                Some(cookie.value().to_string())
            };
        }

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        Reply {
            status,
            body,
            set_cookies,
        }
    }

    pub async fn me(&mut self) -> Reply {
        self.execute(ME, json!({})).await
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Reply {
        self.execute(REGISTER, json!({ "username": username, "password": password }))
            .await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Reply {
        self.execute(LOGIN, json!({ "username": username, "password": password }))
            .await
    }

    pub async fn logout(&mut self) -> Reply {
        self.execute(LOGOUT, json!({})).await
    }
}
