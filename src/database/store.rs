//! Persistence seams used by the auth service and report handlers.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Account, NewAccount, NewReport, Report};

/// Failure creating an account
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Account persistence collaborator
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account. Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>>;
}

/// Incident report persistence collaborator
#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn create(&self, report: NewReport) -> anyhow::Result<Report>;

    /// All reports, newest first
    async fn list(&self) -> anyhow::Result<Vec<Report>>;

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Report>>;
}
