//! JWT Token Service
//!
//! Handles session token creation, validation, and claims management.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Why a presented token was not accepted
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to encode token: {0}")]
    Encode(String),
}

/// JWT Claims structure binding a token to one account
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Account unique identifier
    pub sub: Uuid,
    /// Token issued at timestamp
    pub iat: i64,
    /// Token expiration timestamp
    pub exp: i64,
    /// Token issuer
    pub iss: String,
    /// Unique token id
    pub jti: Uuid,
}

/// A freshly signed token and its expiry
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: i64,
}

/// JWT Service for token operations
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl JwtService {
    /// Create a new JWT service signing with `secret`
    pub fn new(secret: &str, issuer: &str, ttl: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        validation.leeway = 0;

        Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: issuer.to_string(),
            ttl,
        }
    }

    /// Generate a signed token for an account
    pub fn create_token(&self, account_id: Uuid) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expiration = now + self.ttl;

        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken {
            token,
            expires_at: claims.exp,
        })
    }

    /// Verify signature, issuer and expiry, returning the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    /// Unix time after which a revoked `token` no longer needs to be remembered.
    ///
    /// A genuine token is remembered until its own `exp`, even if it has
    /// already lapsed. `None` for anything that fails signature or issuer
    /// checks: the gate rejects those before consulting the registry.
    pub fn revocation_deadline(&self, token: &str) -> Option<i64> {
        let mut lenient = self.validation.clone();
        lenient.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &lenient)
            .ok()
            .map(|data| data.claims.exp)
    }
}
