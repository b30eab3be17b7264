//! Account service: registration, login, session lookup and logout
//!
//! Every operation receives an explicit `AccountContext` carrying the
//! request's collaborators (user store, session, response cookies); there is
//! no ambient state.
//!
//! Expected failures are returned in-band as `FieldError`s inside a
//! `UserOutcome`. Only genuine faults (storage, hashing) travel as `ApiError`,
//! so a caller never sees an empty success.

use std::sync::Arc;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{ResponseCookies, Session};
use crate::models::User;
use crate::repositories::UserStore;
use crate::services::password::PasswordService;

/// Usernames must be longer than this many characters
///
/// Characters are Unicode scalar values, so "😀a" counts as 2, not 3.
pub const USERNAME_MIN_EXCLUSIVE: usize = 2;

/// Passwords must be longer than this many characters
pub const PASSWORD_MIN_EXCLUSIVE: usize = 5;

/// A failure tied to one named input field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of `register` and `login`
#[derive(Debug, Clone)]
pub enum UserOutcome {
    /// The operation produced this user
    Success(User),
    /// Input or credentials were rejected
    Invalid(Vec<FieldError>),
    /// A unique field is already taken
    Conflict(FieldError),
}

impl UserOutcome {
    fn invalid(field: &str, message: &str) -> Self {
        Self::Invalid(vec![FieldError::new(field, message)])
    }

    /// The user, if the operation succeeded
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Success(user) => Some(user),
            _ => None,
        }
    }

    /// Field errors, empty on success
    pub fn errors(&self) -> Vec<FieldError> {
        match self {
            Self::Success(_) => Vec::new(),
            Self::Invalid(errors) => errors.clone(),
            Self::Conflict(error) => vec![error.clone()],
        }
    }
}

/// Per-request collaborators for account operations
#[derive(Clone)]
pub struct AccountContext {
    /// User data access
    pub users: Arc<dyn UserStore>,
    /// The caller's session
    pub session: Session,
    /// Cookies to emit with the response
    pub cookies: ResponseCookies,
}

impl AccountContext {
    pub fn new(users: Arc<dyn UserStore>, session: Session, cookies: ResponseCookies) -> Self {
        Self {
            users,
            session,
            cookies,
        }
    }
}

/// Account operations backing the GraphQL resolvers
#[derive(Clone)]
pub struct AccountService {
    passwords: PasswordService,
    cookie_name: String,
}

impl AccountService {
    /// Create a new service clearing `cookie_name` on logout
    pub fn new(passwords: PasswordService, cookie_name: impl Into<String>) -> Self {
        Self {
            passwords,
            cookie_name: cookie_name.into(),
        }
    }

    /// The user of the current session, `None` when anonymous
    ///
    /// A session pointing at a user that no longer exists is cleared so it
    /// gets purged when the request's session is committed. Lookup failures
    /// are logged and also yield `None`.
    pub async fn me(&self, cx: &AccountContext) -> Option<User> {
        let user_id = cx.session.user_id()?;

        match cx.users.find_by_id(user_id).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => {
                tracing::warn!(user_id = %user_id, "Session refers to a missing user, clearing it");
                cx.session.clear_user_id();
                None
            }
            Err(e) => {
                tracing::error!(error = %e, user_id = %user_id, "Failed to look up session user");
                None
            }
        }
    }

    /// Create a new account; does not log the user in
    ///
    /// # Errors
    /// Storage failures other than a duplicate username, and hashing failures
    pub async fn register(
        &self,
        cx: &AccountContext,
        username: &str,
        password: &str,
    ) -> ApiResult<UserOutcome> {
        if let Some(error) = validate_registration(username, password) {
            return Ok(UserOutcome::Invalid(vec![error]));
        }

        let password_hash = self.passwords.hash(password).await?;

        match cx.users.create(username, &password_hash).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "User registered");
                Ok(UserOutcome::Success(user))
            }
            Err(ApiError::Conflict { .. }) => {
                tracing::debug!(username = %username, "Registration rejected: username taken");
                Ok(UserOutcome::Conflict(FieldError::new(
                    "username",
                    "username already taken",
                )))
            }
            Err(e) => Err(e),
        }
    }

    /// Verify credentials and attach the user to the session
    ///
    /// # Errors
    /// Storage failures and unreadable stored hashes
    pub async fn login(
        &self,
        cx: &AccountContext,
        username: &str,
        password: &str,
    ) -> ApiResult<UserOutcome> {
        let Some(user) = cx.users.find_by_username(username).await? else {
            tracing::debug!(username = %username, "Login failed: unknown username");
            return Ok(UserOutcome::invalid("username", "that username doesn't exist"));
        };

        let valid = self.passwords.verify(password, &user.password).await?;
        if !valid {
            tracing::debug!(user_id = %user.id, "Login failed: incorrect password");
            return Ok(UserOutcome::invalid("password", "incorrect password"));
        }

        cx.session.set_user_id(user.id);
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(UserOutcome::Success(user))
    }

    /// Destroy the session and clear its cookie
    ///
    /// Returns `false` if the store failed to destroy the session. The
    /// cookie is cleared either way.
    pub async fn logout(&self, cx: &AccountContext) -> bool {
        let _clear_cookie = cx.cookies.clear_on_drop(self.cookie_name.as_str());

        match cx.session.destroy().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to destroy session on logout");
                false
            }
        }
    }
}

/// First failing rule, lengths counted in characters
fn validate_registration(username: &str, password: &str) -> Option<FieldError> {
    if username.chars().count() <= USERNAME_MIN_EXCLUSIVE {
        return Some(FieldError::new(
            "username",
            format!("length must be greater than {}", USERNAME_MIN_EXCLUSIVE),
        ));
    }

    if password.chars().count() <= PASSWORD_MIN_EXCLUSIVE {
        return Some(FieldError::new(
            "password",
            format!("length must be greater than {}", PASSWORD_MIN_EXCLUSIVE),
        ));
    }

    None
}
