//! Blocked-label repository.
//!
//! The label set is written by the download pipeline; the validation engine
//! reads it, either draining it in full via
//! [`crate::batch::BlockedLabelSource`] or probing membership in bulk.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::{fmt_time, placeholders};

impl WardenDb {
    /// Insert a blocked label; a label already present is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the INSERT fails.
    pub async fn persist_blocked_label(
        &self,
        label: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let created = fmt_time(created_at);
        self.execute_with(
            "INSERT INTO blocked_label (label, created_at) VALUES (?1, ?2) \
             ON CONFLICT(label) DO NOTHING",
            || libsql::params![label, created.as_str()],
        )
        .await?;
        Ok(())
    }

    /// Which of the given labels are currently blocked.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the lookup query fails.
    pub async fn blocked_among(&self, labels: &[String]) -> Result<HashSet<String>, DatabaseError> {
        if labels.is_empty() {
            return Ok(HashSet::new());
        }
        let sql = format!(
            "SELECT label FROM blocked_label WHERE label IN ({})",
            placeholders(1, labels.len())
        );
        let mut rows = self
            .query_with(&sql, || libsql::params_from_iter(labels.iter().cloned()))
            .await?;
        let mut blocked = HashSet::new();
        while let Some(row) = rows.next().await? {
            blocked.insert(row.get::<String>(0)?);
        }
        Ok(blocked)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{persist_blocked_label, test_db};

    #[tokio::test]
    async fn blocked_among_filters_to_known_labels() {
        let db = test_db().await;
        persist_blocked_label(&db, "foo").await;
        persist_blocked_label(&db, "bar").await;

        let blocked = db
            .blocked_among(&[
                "foo".to_string(),
                "baz".to_string(),
                "bar".to_string(),
            ])
            .await
            .unwrap();
        assert_eq!(blocked.len(), 2);
        assert!(blocked.contains("foo"));
        assert!(blocked.contains("bar"));
    }

    #[tokio::test]
    async fn blocked_among_empty_input() {
        let db = test_db().await;
        assert!(db.blocked_among(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persist_blocked_label_is_idempotent() {
        let db = test_db().await;
        persist_blocked_label(&db, "foo").await;
        persist_blocked_label(&db, "foo").await;

        let blocked = db.blocked_among(&["foo".to_string()]).await.unwrap();
        assert_eq!(blocked.len(), 1);
    }
}
