//! Account mutations for Agora GraphQL API
//!
//! - register: create a new account (does not log in)
//! - login: verify credentials and attach the user to the session
//! - logout: destroy the session and clear its cookie

use async_graphql::{Context, Object, Result};

use crate::error::ApiError;
use crate::graphql::types::{UserResponse, UsernamePasswordInput};
use crate::services::{AccountContext, AccountService};

/// Map internal account errors to a generic message
///
/// The full error is logged server-side; clients only ever see that
/// something went wrong, never database or hashing details.
fn sanitize_account_error(error: &ApiError) -> async_graphql::Error {
    error.log();
    async_graphql::Error::new("An unexpected error occurred")
}

/// Account mutations
#[derive(Default)]
pub struct AuthMutation;

#[Object]
impl AuthMutation {
    /// Register a new account
    ///
    /// Input problems and a taken username are reported in `errors`.
    async fn register(
        &self,
        ctx: &Context<'_>,
        options: UsernamePasswordInput,
    ) -> Result<UserResponse> {
        let service = ctx.data::<AccountService>()?;
        let cx = ctx.data::<AccountContext>()?;

        let outcome = service
            .register(cx, &options.username, &options.password)
            .await
            .map_err(|e| sanitize_account_error(&e))?;

        Ok(outcome.into())
    }

    /// Log in with a username and password
    ///
    /// On success the session cookie is set on the response.
    async fn login(&self, ctx: &Context<'_>, options: UsernamePasswordInput) -> Result<UserResponse> {
        let service = ctx.data::<AccountService>()?;
        let cx = ctx.data::<AccountContext>()?;

        let outcome = service
            .login(cx, &options.username, &options.password)
            .await
            .map_err(|e| sanitize_account_error(&e))?;

        Ok(outcome.into())
    }

    /// End the current session
    ///
    /// Returns false if the session could not be destroyed; the cookie is
    /// cleared regardless.
    async fn logout(&self, ctx: &Context<'_>) -> Result<bool> {
        let service = ctx.data::<AccountService>()?;
        let cx = ctx.data::<AccountContext>()?;

        Ok(service.logout(cx).await)
    }
}
