//! Registry-wide run-lock lease.
//!
//! Best-effort mutual exclusion between the validation run and conflicting
//! pipeline stages. The lease row is acquired in a single statement: either
//! the resource is free, or its previous lease has expired and is stolen.
//! Expiry bounds the damage of a holder that dies without releasing.

use chrono::{DateTime, Duration, Utc};

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::fmt_time;

impl WardenDb {
    /// Try to take the lease on `resource` for `lease` from `now`.
    ///
    /// Returns `false` when another holder's unexpired lease exists; that is
    /// a normal outcome, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the statement fails.
    pub async fn try_acquire_lock(
        &self,
        resource: &str,
        holder: &str,
        lease: Duration,
        now: DateTime<Utc>,
    ) -> Result<bool, DatabaseError> {
        let expires = fmt_time(now + lease);
        let now = fmt_time(now);
        let changed = self
            .execute_with(
                "INSERT INTO run_lock (resource, holder, expires_at) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(resource) DO UPDATE SET \
                     holder = excluded.holder, expires_at = excluded.expires_at \
                 WHERE run_lock.expires_at <= ?4",
                || libsql::params![resource, holder, expires.as_str(), now.as_str()],
            )
            .await?;
        Ok(changed > 0)
    }

    /// Release the lease if this holder still owns it.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the statement fails.
    pub async fn release_lock(&self, resource: &str, holder: &str) -> Result<(), DatabaseError> {
        self.execute_with(
            "DELETE FROM run_lock WHERE resource = ?1 AND holder = ?2",
            || libsql::params![resource, holder],
        )
        .await?;
        Ok(())
    }
}
