//! Business logic services for Agora
//!
//! - Account registration, login and logout
//! - Password hashing
//! - Health checks

pub mod account;
pub mod health;
pub mod password;

pub use account::{AccountContext, AccountService, FieldError, UserOutcome};
pub use health::HealthService;
pub use password::PasswordService;
