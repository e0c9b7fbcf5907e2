//! In-memory stores backing the test suite.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::database::models::{Account, NewAccount, NewReport, Report};
use crate::database::store::{AccountStore, ReportStore, StoreError};

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    /// Drop an account out from under any tokens issued for it
    pub fn remove(&self, id: Uuid) {
        self.accounts.lock().remove(&id);
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.lock();
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let created = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Account>> {
        Ok(self.accounts.lock().get(&id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryReportStore {
    reports: Mutex<Vec<Report>>,
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn create(&self, report: NewReport) -> anyhow::Result<Report> {
        let now = Utc::now();
        let created = Report {
            id: Uuid::new_v4(),
            description: report.description,
            latitude: report.latitude,
            longitude: report.longitude,
            reported_by: Some(report.reported_by),
            created_at: now,
            updated_at: now,
        };
        self.reports.lock().push(created.clone());
        Ok(created)
    }

    async fn list(&self) -> anyhow::Result<Vec<Report>> {
        let mut reports = self.reports.lock().clone();
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(reports)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Report>> {
        Ok(self.reports.lock().iter().find(|r| r.id == id).cloned())
    }
}
