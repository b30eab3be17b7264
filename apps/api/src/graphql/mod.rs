//! GraphQL schema and resolvers for Agora
//!
//! - Query resolvers for the current user
//! - Mutation resolvers for registration, login and logout
//! - Type definitions for all GraphQL objects

pub mod mutation;
pub mod query;
pub mod schema;
pub mod types;

pub use schema::{build_schema, AgoraSchema};
