//! User queries for Agora GraphQL API
//!
//! - me: the user attached to the caller's session

use async_graphql::{Context, Object, Result};

use crate::graphql::types::User;
use crate::services::{AccountContext, AccountService};

/// User-related queries
#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    /// The currently logged-in user, or null when not logged in
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let service = ctx.data::<AccountService>()?;
        let cx = ctx.data::<AccountContext>()?;

        Ok(service.me(cx).await.map(User::from))
    }
}
