//! Database and session models for Agora
//!
//! This module contains the data structures shared by the storage layer,
//! the account service and the GraphQL types.

pub mod session;
pub mod user;

pub use session::SessionData;
pub use user::User;
