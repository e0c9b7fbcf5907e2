//! Postgres-backed incident report store.

use anyhow::{Context, Result};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use uuid::Uuid;

use crate::database::models::{FromRow, NewReport, Report};
use crate::database::store::ReportStore;

#[derive(Debug, Clone)]
pub struct PgReportStore {
    pool: Pool,
}

impl PgReportStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportStore for PgReportStore {
    async fn create(&self, report: NewReport) -> Result<Report> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                "INSERT INTO reports (id, description, latitude, longitude, reported_by) \
                 VALUES ($1, $2, $3, $4, $5) RETURNING *",
                &[
                    &id,
                    &report.description,
                    &report.latitude,
                    &report.longitude,
                    &report.reported_by,
                ],
            )
            .await
            .context("Failed to insert report")?;
        Report::from_row(&row)
    }

    async fn list(&self) -> Result<Vec<Report>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let rows = client
            .query("SELECT * FROM reports ORDER BY created_at DESC", &[])
            .await
            .context("Failed to list reports")?;
        rows.iter().map(Report::from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let client = self.pool.get().await.context("Failed to get DB connection")?;
        let row = client
            .query_opt("SELECT * FROM reports WHERE id = $1", &[&id])
            .await
            .context("Failed to query report")?;
        row.as_ref().map(Report::from_row).transpose()
    }
}
