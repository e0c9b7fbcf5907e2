//! # Server Module
//!
//! HTTP server setup and route configuration for the coral server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::auth::revocation::spawn_sweeper;
use crate::auth::{AuthService, InMemoryRevocationRegistry, JwtService, PasswordHasher, RevocationRegistry};
use crate::config::Config;
use crate::database::{DatabaseConnection, PgAccountStore, PgReportStore, ReportStore};
use crate::routes::health::ping;

/// Application state shared across all route handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub reports: Arc<dyn ReportStore>,
}

/// Assemble every route group plus the CORS layer.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Result<Router> {
    let origins = cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    let app = Router::new()
        .route("/ping", get(ping))
        .merge(crate::routes::auth::create_auth_routes(state.clone()))
        .merge(crate::routes::reports::create_report_routes(state.clone()))
        .layer(
            ServiceBuilder::new().layer(
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([
                        header::ORIGIN,
                        header::CONTENT_TYPE,
                        header::ACCEPT,
                        header::AUTHORIZATION,
                    ])
                    .allow_credentials(true),
            ),
        )
        .with_state(state);

    Ok(app)
}

/// Starts the coral HTTP server.
///
/// Connects to and migrates the database, wires the auth service to its
/// stores and the revocation registry, then serves until Ctrl+C.
pub async fn start(config: Config) -> Result<()> {
    let db = DatabaseConnection::new(config.database.clone()).await?;
    db.migrate().await?;

    let revocations: Arc<dyn RevocationRegistry> = Arc::new(InMemoryRevocationRegistry::new());
    let sweeper = spawn_sweeper(
        revocations.clone(),
        Duration::from_secs(config.auth.revocation_sweep_secs.max(1)),
    );

    let jwt = JwtService::new(
        &config.auth.jwt_secret,
        &config.auth.jwt_issuer,
        config.auth.token_ttl()?,
    );
    let hasher = PasswordHasher::from_config(&config.auth)?;

    let auth = AuthService::new(
        Arc::new(PgAccountStore::new(db.pool().clone())),
        revocations,
        jwt,
        hasher,
    )?;

    let state = AppState {
        auth: Arc::new(auth),
        reports: Arc::new(PgReportStore::new(db.pool().clone())),
    };
    let app = build_router(state, &config.server.cors_origins)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid SERVER_HOST / PORT")?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} - port may already be in use"))?;

    tracing::info!("Coral server listening on http://{}", addr);
    tracing::info!("Health check available at http://{}/ping", addr);
    tracing::info!("Auth endpoints available at http://{}/api/auth/* and /api/CoralauthRoutes/*", addr);
    tracing::info!("Report endpoints available at http://{}/api/reports and /api/ReportRoutes", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    sweeper.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
