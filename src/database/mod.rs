//! # Database Module
//!
//! PostgreSQL integration using tokio-postgres with a deadpool connection pool.
//! Includes connection management, refinery migrations, row models and the
//! store traits the rest of the server depends on.

pub mod accounts;
pub mod connection;
pub mod models;
pub mod reports;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use accounts::PgAccountStore;
pub use connection::{DatabaseConfig, DatabaseConnection};
pub use reports::PgReportStore;
pub use store::{AccountStore, ReportStore, StoreError};
