use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use agora_api::{
    build_schema,
    config::Config,
    middleware::SessionManager,
    repositories::{
        InMemorySessionStore, RedisSessionStore, SessionStore, UserRepository, UserStore,
    },
    routes::{graphql_router, health_router, GraphQLState, HealthState},
    AccountService, PasswordService,
};
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How often the in-memory session fallback drops expired entries
const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected (no origins allowed)
///
/// In development mode:
/// - If `CORS_ORIGINS` is set, those origins are used
/// - If `CORS_ORIGINS` is not set, permissive CORS is used for convenience
fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                CorsLayer::new()
            } else {
                tracing::info!(
                    "CORS configured with {} allowed origin(s): {:?}",
                    allowed_origins.len(),
                    origins
                );
                // Credentials are required for the session cookie
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                    .allow_credentials(true)
                    .max_age(Duration::from_secs(3600))
            }
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected. Set CORS_ORIGINS to allow cross-origin requests."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!(
                "Using permissive CORS in development mode. \
                 Set CORS_ORIGINS for production-like behavior."
            );
            CorsLayer::permissive()
        }
    }
}

/// Connect to Redis and verify it answers PING
async fn connect_redis(url: &str) -> redis::RedisResult<redis::Client> {
    let client = redis::Client::open(url)?;
    let mut conn = client.get_multiplexed_async_connection().await?;
    redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
    Ok(client)
}

/// Pick the session store: Redis when reachable, otherwise the in-memory
/// fallback outside production
async fn build_session_store(config: &Config) -> anyhow::Result<Arc<dyn SessionStore>> {
    let key_prefix = config.session().key_prefix.clone();
    let timeout = Duration::from_secs(config.redis().connect_timeout_secs);

    let connected = match tokio::time::timeout(
        timeout,
        connect_redis(&config.redis().connection_url()),
    )
    .await
    {
        Ok(result) => result.map_err(|e| e.to_string()),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs())),
    };

    match connected {
        Ok(client) => {
            tracing::info!("Redis connected for session storage");
            Ok(Arc::new(RedisSessionStore::new(client, key_prefix)))
        }
        Err(e) if config.is_production() => {
            anyhow::bail!("Redis is required for sessions in production: {}", e)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Redis unavailable, using in-memory sessions. Sessions will not survive restarts"
            );
            let store = InMemorySessionStore::new();

            let cleanup = store.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
                loop {
                    interval.tick().await;
                    cleanup.cleanup().await;
                }
            });

            Ok(Arc::new(store))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "agora_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!(
        environment = %config.common.environment,
        "Starting Agora API server on port {}",
        config.port
    );

    // Initialize database pool
    tracing::info!(url = %config.database().redacted_url(), "Connecting to database...");

    let pool = PgPoolOptions::new()
        .max_connections(config.database().max_connections)
        .min_connections(config.database().min_connections)
        .acquire_timeout(Duration::from_secs(config.database().connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database().idle_timeout_secs))
        .connect(&config.database().url)
        .await?;

    tracing::info!("Database connection established");

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations completed successfully");

    let users: Arc<dyn UserStore> = Arc::new(UserRepository::new(pool.clone()));
    let session_store = build_session_store(&config).await?;

    let sessions = SessionManager::new(
        Arc::clone(&session_store),
        config.session().clone(),
        config.is_production(),
    );

    let account_service = AccountService::new(PasswordService::new(), sessions.cookie_name());
    let schema = build_schema(account_service);
    tracing::info!("GraphQL schema built");

    let graphql_state = GraphQLState::new(schema, sessions, users);
    let health_state = HealthState::new(pool, session_store);

    let cors_layer = build_cors_layer(&config);

    let app = Router::new()
        .route("/", get(root))
        // GraphQL endpoints: /graphql, /graphql/playground
        .nest("/graphql", graphql_router(graphql_state))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(health_state))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> &'static str {
    "Agora API"
}
