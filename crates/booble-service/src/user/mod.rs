//! Account registration, authentication, and lifecycle.

pub mod service;

pub use service::{AuthTokens, LoginRequest, RegisterRequest, UserDto, UserService};
