//! Run-lock seam.
//!
//! At most one reconciliation (and no conflicting pipeline stage) runs
//! registry-wide at a time. The lock is best-effort: failing to acquire it
//! is a normal outcome, not an error — the run is skipped.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use warden_db::WardenDb;

use crate::error::ValidateError;

/// Lock resource name shared by the validation run and the pipeline stages
/// that conflict with it.
pub const VALIDATION_LOCK_RESOURCE: &str = "block-list-validation";

/// Best-effort mutual exclusion around one run.
#[async_trait]
pub trait RunLock: Send + Sync {
    /// Try to take the lock as of `now`. `false` means it is held elsewhere.
    async fn try_acquire(&self, now: DateTime<Utc>) -> Result<bool, ValidateError>;

    /// Give the lock back. Expiry is the backstop if this never happens.
    async fn release(&self) -> Result<(), ValidateError>;
}

/// Lease-row lock in the warden database.
pub struct DbRunLock<'a> {
    db: &'a WardenDb,
    resource: &'static str,
    holder: String,
    lease: Duration,
}

impl<'a> DbRunLock<'a> {
    #[must_use]
    pub fn new(db: &'a WardenDb, holder: impl Into<String>, lease: Duration) -> Self {
        Self {
            db,
            resource: VALIDATION_LOCK_RESOURCE,
            holder: holder.into(),
            lease,
        }
    }
}

#[async_trait]
impl RunLock for DbRunLock<'_> {
    async fn try_acquire(&self, now: DateTime<Utc>) -> Result<bool, ValidateError> {
        Ok(self
            .db
            .try_acquire_lock(self.resource, &self.holder, self.lease, now)
            .await?)
    }

    async fn release(&self) -> Result<(), ValidateError> {
        Ok(self.db.release_lock(self.resource, &self.holder).await?)
    }
}
