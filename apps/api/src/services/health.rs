//! Health check service for verifying external dependencies
//!
//! Checks the two pieces of infrastructure account operations need:
//! - PostgreSQL (user records)
//! - the session store (Redis, or the in-memory fallback)

use serde::Serialize;
use sqlx::PgPool;
use std::time::{Duration, Instant};

use crate::repositories::SessionStore;

/// Status of an individual service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// Service is healthy and responding
    Healthy,
    /// Service is unhealthy or unreachable
    Unhealthy,
}

/// Result of a single service health check
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    /// Name of the service
    pub name: &'static str,
    /// Current status
    pub status: ServiceStatus,
    /// Response time in milliseconds (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Error message if unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    /// Create a healthy service result
    pub fn healthy(name: &'static str, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Healthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: None,
        }
    }

    /// Create an unhealthy service result with response time
    pub fn unhealthy(name: &'static str, error: impl Into<String>, response_time: Duration) -> Self {
        Self {
            name,
            status: ServiceStatus::Unhealthy,
            response_time_ms: Some(response_time.as_millis() as u64),
            error: Some(error.into()),
        }
    }
}

/// Aggregated health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResponse {
    /// Overall status (healthy only if every service is healthy)
    pub status: ServiceStatus,
    /// Individual service health results
    pub services: Vec<ServiceHealth>,
    /// Total time to complete all health checks
    pub total_time_ms: u64,
    /// API version
    pub version: &'static str,
}

impl HealthCheckResponse {
    /// Create a new health check response from individual service results
    pub fn new(services: Vec<ServiceHealth>, total_time: Duration) -> Self {
        let status = if services.iter().all(|s| s.status == ServiceStatus::Healthy) {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        };

        Self {
            status,
            services,
            total_time_ms: total_time.as_millis() as u64,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    /// Check if overall health is good
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

/// Health check service
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Run `SELECT 1` on the shared pool
    pub async fn check_database(&self, pool: &PgPool) -> ServiceHealth {
        let start = Instant::now();

        match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
            Ok(_) => ServiceHealth::healthy("database", start.elapsed()),
            Err(e) => ServiceHealth::unhealthy(
                "database",
                format!("Query failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Ping the session store
    pub async fn check_session_store(&self, store: &dyn SessionStore) -> ServiceHealth {
        let start = Instant::now();

        match store.ping().await {
            Ok(()) => ServiceHealth::healthy("session_store", start.elapsed()),
            Err(e) => ServiceHealth::unhealthy(
                "session_store",
                format!("Ping failed: {}", e),
                start.elapsed(),
            ),
        }
    }

    /// Run all health checks concurrently
    pub async fn check_all(&self, pool: &PgPool, store: &dyn SessionStore) -> HealthCheckResponse {
        let start = Instant::now();

        let (db_health, session_health) =
            tokio::join!(self.check_database(pool), self.check_session_store(store));

        HealthCheckResponse::new(vec![db_health, session_health], start.elapsed())
    }
}
