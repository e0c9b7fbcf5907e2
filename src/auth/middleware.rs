//! Authentication Middleware
//!
//! Axum middleware that runs the token gate and injects the account id.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::auth::{error::AuthError, models::AuthUser};
use crate::server::AppState;

/// Cookie the login and register handlers set alongside the JSON token
pub const TOKEN_COOKIE: &str = "access_token";

/// Pull the raw session token from `Authorization: Bearer <token>`, falling
/// back to the `access_token` cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok())
                .flat_map(|cookies| cookies.split(';'))
                .filter_map(|cookie| cookie.trim().strip_prefix(TOKEN_COOKIE)?.strip_prefix('='))
                .find(|token| !token.is_empty())
                .map(str::to_string)
        })
}

/// Authentication middleware that validates session tokens and injects user info
pub struct AuthMiddleware;

impl AuthMiddleware {
    /// Reject the request unless it carries a valid, unrevoked token for a
    /// live account.
    pub async fn require_auth(
        State(state): State<AppState>,
        mut req: Request,
        next: Next,
    ) -> Result<Response, AuthError> {
        let token = extract_token(req.headers());
        let account_id = state.auth.validate_token(token.as_deref()).await?;

        tracing::debug!("Authenticated {} {} as {}", req.method(), req.uri(), account_id);
        req.extensions_mut().insert(AuthUser { id: account_id });

        Ok(next.run(req).await)
    }
}
