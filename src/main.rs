//! Coral server entry point.
//!
//! ## Environment Setup
//! Put at least `JWT_SECRET` and `DATABASE_URL` in `.env`; see `config.rs`
//! for the optional knobs.
//!
//! ## Running the Server
//! ```bash
//! cargo run
//! ```
//!
//! The server listens on `http://0.0.0.0:5000` by default:
//! ```bash
//! curl http://localhost:5000/ping
//! ```

use coral_server::{config::Config, server};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false) // Don't show module targets for cleaner output
                .compact(),
        )
        .init();

    tracing::info!("Starting Coral Server...");
    tracing::info!("Package: {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    tracing::info!("Build profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });

    // Refuse to start without a signing secret rather than fall back to a known one
    let config = Config::from_env().inspect_err(|e| tracing::error!("Configuration error: {:#}", e))?;

    server::start(config).await
}
