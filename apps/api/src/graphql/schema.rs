//! GraphQL schema builder for Agora
//!
//! The schema holds only process-wide services. Per-request collaborators
//! (`AccountContext`) are attached to each request by the HTTP handler.

use async_graphql::{EmptySubscription, Schema};

use crate::services::AccountService;

use super::mutation::Mutation;
use super::query::Query;

/// The Agora GraphQL schema type
pub type AgoraSchema = Schema<Query, Mutation, EmptySubscription>;

/// Create the GraphQL schema around the account service
pub fn build_schema(account_service: AccountService) -> AgoraSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(account_service)
        .finish()
}
