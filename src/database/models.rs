// Database Models
//
// Tokio-postgres compatible models for the account and incident report tables.

use std::fmt;
use std::str::FromStr;

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;
use uuid::Uuid;

/// Trait for converting from tokio-postgres Row
pub trait FromRow {
    fn from_row(row: &Row) -> Result<Self>
    where
        Self: Sized;
}

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Stakeholder group an account belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Researcher,
    Farmer,
    TourismGuide,
    MarineAuthority,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Researcher => "researcher",
            Role::Farmer => "farmer",
            Role::TourismGuide => "tourism_guide",
            Role::MarineAuthority => "marine_authority",
        }
    }

    /// Resolve a role supplied at registration.
    ///
    /// Absent or unrecognised values fall back to `Researcher`.
    pub fn from_request(raw: Option<&str>) -> Self {
        raw.and_then(|r| r.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "researcher" => Ok(Role::Researcher),
            "farmer" => Ok(Role::Farmer),
            "tourism_guide" => Ok(Role::TourismGuide),
            "marine_authority" => Ok(Role::MarineAuthority),
            other => Err(anyhow!("unknown role: {other}")),
        }
    }
}

/// Stored account row.
///
/// Deliberately not `Serialize`: the password hash must never reach a
/// response body. Convert to `PublicAccount` for output.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Account {
    fn from_row(row: &Row) -> Result<Self> {
        let role: String = row.try_get("role")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: role.parse()?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fields needed to insert an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// ============================================================================
// INCIDENT REPORTS
// ============================================================================

/// Field observation pinned to a map location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub description: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub reported_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FromRow for Report {
    fn from_row(row: &Row) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            reported_by: row.try_get("reported_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Validated report awaiting insertion
#[derive(Debug, Clone)]
pub struct NewReport {
    pub description: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub reported_by: Uuid,
}
