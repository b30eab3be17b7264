//! GraphQL HTTP route handlers
//!
//! - `POST /graphql` - Execute a GraphQL request
//! - `GET /graphql/playground` - GraphQL Playground (development aid)
//!
//! Each request gets its own `AccountContext`: the session named by the
//! request cookie, the user store, and a cookie writer. After execution the
//! session is committed and queued cookies become `Set-Cookie` headers.

use std::sync::Arc;

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::{FromRef, State},
    http::HeaderMap,
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};

use crate::graphql::AgoraSchema;
use crate::middleware::{RequestSession, ResponseCookies, SessionManager};
use crate::repositories::UserStore;
use crate::services::AccountContext;

/// Shared application state for the GraphQL handler
#[derive(Clone)]
pub struct GraphQLState {
    /// Executable schema
    pub schema: AgoraSchema,
    /// Loads and commits request sessions
    pub sessions: SessionManager,
    /// User data access handed to resolvers
    pub users: Arc<dyn UserStore>,
}

impl GraphQLState {
    pub fn new(schema: AgoraSchema, sessions: SessionManager, users: Arc<dyn UserStore>) -> Self {
        Self {
            schema,
            sessions,
            users,
        }
    }
}

impl FromRef<GraphQLState> for SessionManager {
    fn from_ref(state: &GraphQLState) -> Self {
        state.sessions.clone()
    }
}

/// Create the GraphQL router, to be nested under `/graphql`
pub fn graphql_router(state: GraphQLState) -> Router {
    Router::new()
        .route("/", post(graphql_handler))
        .route("/playground", get(graphql_playground))
        .with_state(state)
}

/// Execute a GraphQL request inside the caller's session
async fn graphql_handler(
    State(state): State<GraphQLState>,
    RequestSession(session): RequestSession,
    req: GraphQLRequest,
) -> (HeaderMap, GraphQLResponse) {
    let cookies = ResponseCookies::new();
    let cx = AccountContext::new(Arc::clone(&state.users), session.clone(), cookies.clone());

    let response = state.schema.execute(req.into_inner().data(cx)).await;

    if let Err(e) = state.sessions.commit(&session, &cookies).await {
        tracing::error!(error = %e, "Failed to commit session");
    }

    (cookies.to_headers(), response.into())
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(playground_source(GraphQLPlaygroundConfig::new("/graphql")))
}
