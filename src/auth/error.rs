//! Authentication error types.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::database::StoreError;

/// Precise cause behind an `Unauthenticated` outcome.
///
/// Logged server-side; callers only ever see the generic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    MissingToken,
    InvalidSignature,
    Expired,
    Revoked,
    UnknownAccount,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Rejection::MissingToken => "no token presented",
            Rejection::InvalidSignature => "signature or claims invalid",
            Rejection::Expired => "token expired",
            Rejection::Revoked => "token revoked",
            Rejection::UnknownAccount => "account no longer exists",
        })
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("email already exists")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("unauthenticated: {0}")]
    Unauthenticated(Rejection),

    #[error("no token provided")]
    MissingToken,

    #[error("user not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::Validation(rejection.body_text())
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            StoreError::Other(e) => AuthError::Internal(e),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::DuplicateEmail => (StatusCode::BAD_REQUEST, "Email already exists".to_string()),
            AuthError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password".to_string())
            }
            AuthError::Unauthenticated(reason) => {
                tracing::warn!("Rejected request: {}", reason);
                (StatusCode::UNAUTHORIZED, "Invalid or expired token".to_string())
            }
            AuthError::MissingToken => (StatusCode::BAD_REQUEST, "No token provided".to_string()),
            AuthError::NotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AuthError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AuthError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        let cases = [
            (AuthError::DuplicateEmail, StatusCode::BAD_REQUEST),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Unauthenticated(Rejection::Revoked), StatusCode::UNAUTHORIZED),
            (AuthError::MissingToken, StatusCode::BAD_REQUEST),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                AuthError::Internal(anyhow::anyhow!("connection refused")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn unauthenticated_reasons_share_one_message() {
        let mut bodies = Vec::new();
        for reason in [
            Rejection::InvalidSignature,
            Rejection::Expired,
            Rejection::Revoked,
            Rejection::UnknownAccount,
        ] {
            let response = AuthError::Unauthenticated(reason).into_response();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            bodies.push(bytes);
        }
        assert!(bodies.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_detail() {
        let response =
            AuthError::Internal(anyhow::anyhow!("relation \"users\" does not exist")).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!body.contains("relation"));
        assert!(body.contains("Server error"));
    }
}
