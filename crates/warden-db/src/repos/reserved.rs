//! Reserved-name projection repository.
//!
//! Reserved names carry a validity window; a name is reserved as of an
//! instant when the window contains it.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::{fmt_time, placeholders};

impl WardenDb {
    /// Insert or update one reserved name (replication sink).
    ///
    /// `end_time: None` leaves the reservation open-ended.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the write fails.
    pub async fn upsert_reserved_name(
        &self,
        domain_name: &str,
        start_time: DateTime<Utc>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        let start = fmt_time(start_time);
        let end = end_time.map(fmt_time);
        self.execute_with(
            "INSERT INTO reserved_name (domain_name, start_time, end_time) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(domain_name) DO UPDATE SET \
                 start_time = excluded.start_time, \
                 end_time = excluded.end_time",
            || libsql::params![domain_name, start.as_str(), end.as_deref()],
        )
        .await?;
        Ok(())
    }

    /// All domain names reserved as of `as_of`, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn reserved_names_as_of(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let as_of = fmt_time(as_of);
        let mut rows = self
            .query_with(
                "SELECT domain_name FROM reserved_name \
                 WHERE start_time <= ?1 AND (end_time IS NULL OR end_time > ?1) \
                 ORDER BY domain_name",
                || libsql::params![as_of.as_str()],
            )
            .await?;
        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            names.push(row.get::<String>(0)?);
        }
        Ok(names)
    }

    /// Which of the given domain names are reserved as of `as_of`, in one
    /// keyed lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn reserved_among(
        &self,
        domain_names: &[String],
        as_of: DateTime<Utc>,
    ) -> Result<HashSet<String>, DatabaseError> {
        if domain_names.is_empty() {
            return Ok(HashSet::new());
        }
        let sql = format!(
            "SELECT domain_name FROM reserved_name \
             WHERE domain_name IN ({}) \
               AND start_time <= ?{n} AND (end_time IS NULL OR end_time > ?{n})",
            placeholders(1, domain_names.len()),
            n = domain_names.len() + 1
        );
        let as_of = fmt_time(as_of);
        let mut rows = self
            .query_with(&sql, || {
                libsql::params_from_iter(
                    domain_names
                        .iter()
                        .cloned()
                        .chain(std::iter::once(as_of.clone())),
                )
            })
            .await?;
        let mut reserved = HashSet::new();
        while let Some(row) = rows.next().await? {
            reserved.insert(row.get::<String>(0)?);
        }
        Ok(reserved)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{t, test_db};

    #[tokio::test]
    async fn reservation_window_is_honored() {
        let db = test_db().await;
        db.upsert_reserved_name("open.app", t("2026-01-01T00:00:00Z"), None)
            .await
            .unwrap();
        db.upsert_reserved_name(
            "expired.app",
            t("2025-01-01T00:00:00Z"),
            Some(t("2025-12-31T00:00:00Z")),
        )
        .await
        .unwrap();
        db.upsert_reserved_name("future.app", t("2027-01-01T00:00:00Z"), None)
            .await
            .unwrap();

        let names = db
            .reserved_names_as_of(t("2026-06-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(names, vec!["open.app".to_string()]);
    }

    #[tokio::test]
    async fn reserved_among_is_keyed() {
        let db = test_db().await;
        db.upsert_reserved_name("a.app", t("2026-01-01T00:00:00Z"), None)
            .await
            .unwrap();
        db.upsert_reserved_name("b.app", t("2026-01-01T00:00:00Z"), None)
            .await
            .unwrap();

        let reserved = db
            .reserved_among(
                &["a.app".to_string(), "c.app".to_string()],
                t("2026-06-01T00:00:00Z"),
            )
            .await
            .unwrap();
        assert_eq!(reserved.len(), 1);
        assert!(reserved.contains("a.app"));
    }
}
