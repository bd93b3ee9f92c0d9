//! Download-job repository.
//!
//! One row per feed download cycle, written by the download pipeline as it
//! advances through its stages. Validation anchors on the most recent cycle
//! and only runs when that cycle finished cleanly.

use chrono::{DateTime, Utc};
use warden_core::entities::DownloadJob;
use warden_core::enums::DownloadStage;

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::{fmt_time, parse_datetime};

impl WardenDb {
    /// Insert a download job or update its stage.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the write fails.
    pub async fn persist_download_job(
        &self,
        job_name: &str,
        stage: DownloadStage,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let created = fmt_time(created_at);
        self.execute_with(
            "INSERT INTO download_job (job_name, stage, created_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(job_name) DO UPDATE SET stage = excluded.stage",
            || libsql::params![job_name, stage.as_str(), created.as_str()],
        )
        .await?;
        Ok(())
    }

    /// The most recent download cycle, regardless of its stage.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails or a stored stage is
    /// unparseable.
    pub async fn latest_download_job(&self) -> Result<Option<DownloadJob>, DatabaseError> {
        let mut rows = self
            .query_with(
                "SELECT job_name, stage, created_at FROM download_job \
                 ORDER BY created_at DESC, job_name DESC LIMIT 1",
                || (),
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(DownloadJob {
                job_name: row.get::<String>(0)?,
                stage: row
                    .get::<String>(1)?
                    .parse::<DownloadStage>()
                    .map_err(|e| DatabaseError::Query(e.to_string()))?,
                created_at: parse_datetime(&row.get::<String>(2)?)?,
            })),
            None => Ok(None),
        }
    }

    /// The most recent download job's name, if that job has completed.
    ///
    /// A most-recent job still in flight (or failed) yields `None`:
    /// validating against an older completed download would report phantom
    /// discrepancies against the newer, partially applied one.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn most_recent_completed_job(&self) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .latest_download_job()
            .await?
            .filter(|job| job.stage == DownloadStage::Done)
            .map(|job| job.job_name))
    }
}
