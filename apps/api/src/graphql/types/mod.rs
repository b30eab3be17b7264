//! GraphQL type definitions for Agora

mod user;

pub use user::{FieldError, User, UserResponse, UsernamePasswordInput};
