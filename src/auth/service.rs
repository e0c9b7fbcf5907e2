//! Credential & token service: registration, login, the token gate, the
//! current-user lookup and logout.

use std::sync::Arc;

use anyhow::Context;
use uuid::Uuid;

use crate::auth::error::{AuthError, Rejection};
use crate::auth::jwt::{JwtService, TokenError};
use crate::auth::models::{LoginRequest, PublicAccount, RegisterRequest, Session};
use crate::auth::password::{PasswordError, PasswordHasher};
use crate::auth::revocation::RevocationRegistry;
use crate::database::models::{Account, NewAccount, Role};
use crate::database::store::AccountStore;

/// Authentication service.
///
/// Holds its collaborators behind trait objects so the HTTP layer and the
/// tests can swap storage without touching the auth rules.
pub struct AuthService {
    accounts: Arc<dyn AccountStore>,
    revocations: Arc<dyn RevocationRegistry>,
    jwt: JwtService,
    hasher: PasswordHasher,
    /// Hash verified against when no account matches a login email, so both
    /// failure paths cost one Argon2 run
    decoy_hash: String,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        revocations: Arc<dyn RevocationRegistry>,
        jwt: JwtService,
        hasher: PasswordHasher,
    ) -> Result<Self, PasswordError> {
        let decoy_hash = hasher.hash("coral-decoy-credential")?;

        Ok(Self {
            accounts,
            revocations,
            jwt,
            hasher,
            decoy_hash,
        })
    }

    /// Create an account and sign the caller straight in.
    pub async fn register(&self, input: RegisterRequest) -> Result<Session, AuthError> {
        let name = input.name.trim().to_string();
        let email = normalize_email(&input.email);

        if name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation(
                "Name, email and password are required".to_string(),
            ));
        }
        if !is_plausible_email(&email) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = self.hash_password(input.password).await?;
        let account = self
            .accounts
            .create(NewAccount {
                name,
                email,
                password_hash,
                role: Role::from_request(input.role.as_deref()),
            })
            .await?;

        tracing::info!("Registered account {} ({})", account.id, account.role);
        self.open_session(&account)
    }

    /// Exchange email and password for a fresh session token.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(&self, input: LoginRequest) -> Result<Session, AuthError> {
        let email = normalize_email(&input.email);

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            self.verify_password(input.password, self.decoy_hash.clone()).await?;
            tracing::warn!("Login failed: no account for submitted email");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .verify_password(input.password, account.password_hash.clone())
            .await?
        {
            tracing::warn!("Login failed: password mismatch for account {}", account.id);
            return Err(AuthError::InvalidCredentials);
        }

        self.open_session(&account)
    }

    /// The single gating check every protected operation runs first.
    ///
    /// Returns the account the token is bound to.
    pub async fn validate_token(&self, token: Option<&str>) -> Result<Uuid, AuthError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthenticated(Rejection::MissingToken))?;

        let claims = self.jwt.validate_token(token).map_err(|e| match e {
            TokenError::Expired => AuthError::Unauthenticated(Rejection::Expired),
            _ => AuthError::Unauthenticated(Rejection::InvalidSignature),
        })?;

        if self.revocations.contains(token).await {
            return Err(AuthError::Unauthenticated(Rejection::Revoked));
        }

        if self.accounts.find_by_id(claims.sub).await?.is_none() {
            return Err(AuthError::Unauthenticated(Rejection::UnknownAccount));
        }

        Ok(claims.sub)
    }

    /// Public profile of an account. Never carries the password hash.
    pub async fn current_user(&self, account_id: Uuid) -> Result<PublicAccount, AuthError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .as_ref()
            .map(PublicAccount::from)
            .ok_or(AuthError::NotFound)
    }

    /// Revoke `token`. Succeeds for tokens that are already revoked or were
    /// never valid.
    ///
    /// Only tokens carrying our signature are recorded; the gate already
    /// refuses everything else.
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;

        match self.jwt.revocation_deadline(token) {
            Some(deadline) => {
                self.revocations.add(token, deadline).await;
                tracing::info!("Token revoked until {}", deadline);
            }
            None => tracing::debug!("Logout with an unverifiable token, nothing to revoke"),
        }
        Ok(())
    }

    fn open_session(&self, account: &Account) -> Result<Session, AuthError> {
        let issued = self
            .jwt
            .create_token(account.id)
            .context("Failed to issue session token")?;

        Ok(Session {
            token: issued.token,
            expires_at: issued.expires_at,
            user: PublicAccount::from(account),
        })
    }

    async fn hash_password(&self, password: String) -> Result<String, AuthError> {
        let hasher = self.hasher.clone();
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .context("Password hashing task panicked")?
            .context("Failed to hash password")?;
        Ok(hash)
    }

    async fn verify_password(&self, password: String, hash: String) -> Result<bool, AuthError> {
        let hasher = self.hasher.clone();
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .context("Password verification task panicked")?
            .context("Failed to verify password")?;
        Ok(matches)
    }
}

fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
}
