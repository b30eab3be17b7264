//! Storage layer for Agora
//!
//! Account logic talks to storage only through the `UserStore` and
//! `SessionStore` traits, so each request can be handed its collaborators
//! explicitly:
//! - `UserRepository` / `RedisSessionStore` back the running server
//! - the in-memory stores serve tests and the development fallback

pub mod memory;
pub mod session;
pub mod user;

pub use memory::{InMemorySessionStore, InMemoryUserStore};
pub use session::{RedisSessionStore, SessionStore};
pub use user::{UserRepository, UserStore};
