//! HTTP route handlers for the Agora API
//!
//! - GraphQL endpoint and playground
//! - Health check and status endpoints

pub mod graphql;
pub mod health;

pub use graphql::{graphql_router, GraphQLState};
pub use health::{health_router, HealthState};
