//! # Coral Server
//!
//! Backend for the coral-reef monitoring app: account registration and
//! login with signed session tokens, a revocation registry consulted on every
//! protected request, and incident reports pinned to map coordinates.
//!
//! ## Architecture
//! - `config`: environment variable configuration
//! - `auth`: password hashing, token issuance/validation, revocation, gate middleware
//! - `database`: PostgreSQL pool, migrations, row models and store traits
//! - `routes`: HTTP handlers grouped by API area
//! - `server`: router assembly and the serve loop

pub mod auth;
pub mod config;
pub mod database;
pub mod routes;
pub mod server;
