//! # warden-db
//!
//! libSQL database operations for Warden block-list state.
//!
//! Holds the block-list tables written by the download pipeline
//! (`blocked_label`, `unblockable_domain`, `download_job`), the replicated
//! registry-truth projections the validation engine reads (`domain`,
//! `reserved_name`, `tld`), and the registry-wide run-lock lease.
//!
//! The validation engine never mutates block-list or registry-truth state;
//! its reads go through short snapshot transactions (see [`WardenDb::begin_snapshot`])
//! or single bulk-keyed queries, both bounded by design.

pub mod batch;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod retry;

#[cfg(test)]
mod test_support;

use std::sync::atomic::{AtomicBool, Ordering};

use libsql::Builder;

use error::DatabaseError;
use retry::RetryConfig;

/// Central database handle for all Warden state operations.
///
/// Wraps a libSQL database and connection and tracks whether a transaction
/// is currently open on the connection. The tracking is what lets batch
/// iteration fail fast instead of silently reusing an enclosing
/// transaction's stale view.
pub struct WardenDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    in_txn: AtomicBool,
    retry: RetryConfig,
}

impl WardenDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Must be per-connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let warden_db = Self {
            db,
            conn,
            in_txn: AtomicBool::new(false),
            retry: RetryConfig::default(),
        };
        warden_db.run_migrations().await?;
        Ok(warden_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Whether a transaction is currently open on this handle.
    #[must_use]
    pub fn in_transaction(&self) -> bool {
        self.in_txn.load(Ordering::SeqCst)
    }

    /// Begin a read snapshot: a deferred transaction whose queries all see
    /// the database as of the first read.
    ///
    /// The returned guard must be finished with [`Snapshot::rollback`];
    /// dropping it releases the nesting flag either way. Snapshots do not
    /// nest — the caller that wants a consistent view across reads holds one
    /// snapshot for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IllegalState`] when a transaction is already
    /// open on this handle.
    pub async fn begin_snapshot(&self) -> Result<Snapshot<'_>, DatabaseError> {
        if self.in_txn.swap(true, Ordering::SeqCst) {
            return Err(DatabaseError::IllegalState(
                "snapshot cannot be nested in a transaction".to_string(),
            ));
        }
        match self
            .conn
            .transaction_with_behavior(libsql::TransactionBehavior::Deferred)
            .await
        {
            Ok(txn) => Ok(Snapshot {
                txn: Some(txn),
                db: self,
            }),
            Err(e) => {
                self.in_txn.store(false, Ordering::SeqCst);
                Err(e.into())
            }
        }
    }

    /// Execute a statement, retrying transient contention errors.
    ///
    /// `params` is a closure so each attempt binds fresh parameters.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the statement still fails after the
    /// configured retries, or immediately on a non-transient error.
    pub async fn execute_with<P, F>(&self, sql: &str, params: F) -> Result<u64, DatabaseError>
    where
        P: libsql::params::IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.execute(sql, params()).await {
                Ok(n) => return Ok(n),
                Err(e) if attempt < self.retry.max_attempts && retry::is_transient_error(&e) => {
                    tracing::warn!(error = %e, attempt, "transient database error; retrying");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Run a query, retrying transient contention errors.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] when the query still fails after the
    /// configured retries, or immediately on a non-transient error.
    pub async fn query_with<P, F>(&self, sql: &str, params: F) -> Result<libsql::Rows, DatabaseError>
    where
        P: libsql::params::IntoParams,
        F: Fn() -> P,
    {
        let mut attempt = 1;
        loop {
            match self.conn.query(sql, params()).await {
                Ok(rows) => return Ok(rows),
                Err(e) if attempt < self.retry.max_attempts && retry::is_transient_error(&e) => {
                    tracing::warn!(error = %e, attempt, "transient database error; retrying");
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// RAII guard over one deferred read transaction.
///
/// Queries issued through the guard see a single consistent point-in-time
/// view. Rows come back as owned values with no tie to the transaction, so
/// callers may reload or act on them after the snapshot ends.
pub struct Snapshot<'a> {
    txn: Option<libsql::Transaction>,
    db: &'a WardenDb,
}

impl Snapshot<'_> {
    /// Run a query inside the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails or the snapshot has
    /// already been finished.
    pub async fn query(
        &self,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<libsql::Rows, DatabaseError> {
        let txn = self.txn.as_ref().ok_or_else(|| {
            DatabaseError::IllegalState("snapshot already finished".to_string())
        })?;
        Ok(txn.query(sql, params).await?)
    }

    /// End the snapshot. Read-only, so rollback and commit are equivalent;
    /// rollback states the intent.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the underlying rollback fails. The
    /// nesting flag is released on every path.
    pub async fn rollback(mut self) -> Result<(), DatabaseError> {
        if let Some(txn) = self.txn.take() {
            txn.rollback().await?;
        }
        Ok(())
    }
}

impl Drop for Snapshot<'_> {
    fn drop(&mut self) {
        self.db.in_txn.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> WardenDb {
        WardenDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "blocked_label",
            "unblockable_domain",
            "download_job",
            "domain",
            "reserved_name",
            "tld",
            "run_lock",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn snapshot_queries_and_finishes() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO blocked_label (label, created_at) VALUES ('abc', '2026-01-01T00:00:00.000000Z')",
                (),
            )
            .await
            .unwrap();

        let snapshot = db.begin_snapshot().await.unwrap();
        assert!(db.in_transaction());
        let mut rows = snapshot
            .query("SELECT label FROM blocked_label", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "abc");
        snapshot.rollback().await.unwrap();
        assert!(!db.in_transaction());
    }

    #[tokio::test]
    async fn snapshot_does_not_nest() {
        let db = test_db().await;
        let outer = db.begin_snapshot().await.unwrap();
        let err = db.begin_snapshot().await.err().unwrap();
        assert!(matches!(err, DatabaseError::IllegalState(_)));
        outer.rollback().await.unwrap();

        // Released after the outer snapshot ends.
        let again = db.begin_snapshot().await.unwrap();
        again.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn dropping_snapshot_releases_flag() {
        let db = test_db().await;
        {
            let _snapshot = db.begin_snapshot().await.unwrap();
            assert!(db.in_transaction());
        }
        assert!(!db.in_transaction());
    }
}
