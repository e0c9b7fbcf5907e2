//! Auth routes for registration, login, profile and logout

use axum::{
    Extension, Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde_json::{Value, json};

use crate::auth::middleware::{AuthMiddleware, TOKEN_COOKIE, extract_token};
use crate::auth::models::{AuthUser, LoginRequest, RegisterRequest, TokenResponse};
use crate::auth::AuthError;
use crate::server::AppState;

/// Cookie mirroring the session token, expiring with it
fn session_cookie(token: String, expires_at: i64) -> Cookie<'static> {
    let max_age = (expires_at - Utc::now().timestamp()).max(0);
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, CookieJar, Json<TokenResponse>), AuthError> {
    let Json(payload) = payload?;
    let session = state.auth.register(payload).await?;
    let jar = jar.add(session_cookie(session.token.clone(), session.expires_at));

    Ok((
        StatusCode::CREATED,
        jar,
        Json(TokenResponse::new("User registered successfully", session)),
    ))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<TokenResponse>), AuthError> {
    let Json(payload) = payload?;
    let session = state.auth.login(payload).await?;
    let jar = jar.add(session_cookie(session.token.clone(), session.expires_at));

    Ok((jar, Json(TokenResponse::new("Login successful", session))))
}

/// `GET /api/auth/profile`, behind the token gate
pub async fn profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Value>, AuthError> {
    let account = state.auth.current_user(user.id).await?;
    Ok(Json(json!({ "user": account })))
}

/// `POST /api/auth/logout`
///
/// Not behind the gate: revoking a token that is already revoked or invalid
/// still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
) -> Result<(CookieJar, Json<Value>), AuthError> {
    let token = extract_token(&headers);
    state.auth.logout(token.as_deref()).await?;

    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    Ok((jar, Json(json!({ "message": "Logout successful" }))))
}

/// Prefix the existing web client calls; served alongside `/api/auth`
pub const LEGACY_AUTH_PREFIX: &str = "/api/CoralauthRoutes";

fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/profile", get(profile))
        .route_layer(middleware::from_fn_with_state(state, AuthMiddleware::require_auth));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected)
}

pub fn create_auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/api/auth", auth_routes(state.clone()))
        .nest(LEGACY_AUTH_PREFIX, auth_routes(state))
}
