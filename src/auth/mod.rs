//! # Authentication Module
//!
//! Password hashing, session token issuance and validation, the revocation
//! registry consulted on every protected request, and the middleware that
//! gates those routes.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod revocation;
pub mod service;

pub use error::AuthError;
pub use jwt::JwtService;
pub use middleware::AuthMiddleware;
pub use password::PasswordHasher;
pub use revocation::{InMemoryRevocationRegistry, RevocationRegistry};
pub use service::AuthService;
