//! Middleware components for the Agora API
//!
//! - `session`: cookie-keyed session loading/commit and the `RequestSession` extractor
//! - `cookies`: the per-request `Set-Cookie` writer handed to resolvers

pub mod cookies;
pub mod session;

pub use cookies::{ClearCookieGuard, ResponseCookies};
pub use session::{RequestSession, Session, SessionManager};
