// # Routes Module
//
// HTTP route handlers for the coral server, one submodule per API area.
// Each area exposes a `create_*_routes` builder merged in `server.rs`.

/// Liveness endpoint
pub mod health;

/// Registration, login, profile and logout
pub mod auth;

/// Incident report filing and lookup
pub mod reports;
