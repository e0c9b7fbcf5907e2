//! Postgres-backed account store.

use anyhow::Context;
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::database::models::{Account, FromRow, NewAccount};
use crate::database::store::{AccountStore, StoreError};

#[derive(Debug, Clone)]
pub struct PgAccountStore {
    pool: Pool,
}

impl PgAccountStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let id = Uuid::new_v4();
        let role = account.role.as_str();

        let row = client
            .query_one(
                "INSERT INTO users (id, name, email, password_hash, role) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
                &[&id, &account.name, &account.email, &account.password_hash, &role],
            )
            .await
            .map_err(|e| {
                // Lost a race with a concurrent registration for the same email
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    StoreError::DuplicateEmail
                } else {
                    StoreError::Other(anyhow::Error::new(e).context("Failed to insert user"))
                }
            })?;

        Ok(Account::from_row(&row)?)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE email = $1", &[&email])
            .await
            .context("Failed to query user by email")?;
        row.as_ref().map(Account::from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM users WHERE id = $1", &[&id])
            .await
            .context("Failed to query user by id")?;
        row.as_ref().map(Account::from_row).transpose()
    }
}
