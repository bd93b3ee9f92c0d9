//! TLD projection repository.
//!
//! A TLD is enrolled in the blocking program once its enrollment start time
//! is set and has passed.

use chrono::{DateTime, Utc};

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::fmt_time;

impl WardenDb {
    /// Insert or update one TLD row (replication sink).
    ///
    /// `enroll_start_time: None` marks the TLD as not enrolled.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the write fails.
    pub async fn upsert_tld(
        &self,
        tld: &str,
        enroll_start_time: Option<DateTime<Utc>>,
    ) -> Result<(), DatabaseError> {
        let enroll = enroll_start_time.map(fmt_time);
        self.execute_with(
            "INSERT INTO tld (tld, enroll_start_time) VALUES (?1, ?2) \
             ON CONFLICT(tld) DO UPDATE SET enroll_start_time = excluded.enroll_start_time",
            || libsql::params![tld, enroll.as_deref()],
        )
        .await?;
        Ok(())
    }

    /// TLDs enrolled in the blocking program as of `as_of`, in name order.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn enrolled_tlds_as_of(
        &self,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let as_of = fmt_time(as_of);
        let mut rows = self
            .query_with(
                "SELECT tld FROM tld \
                 WHERE enroll_start_time IS NOT NULL AND enroll_start_time <= ?1 \
                 ORDER BY tld",
                || libsql::params![as_of.as_str()],
            )
            .await?;
        let mut tlds = Vec::new();
        while let Some(row) = rows.next().await? {
            tlds.push(row.get::<String>(0)?);
        }
        Ok(tlds)
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{t, test_db};

    #[tokio::test]
    async fn only_enrolled_tlds_are_listed() {
        let db = test_db().await;
        db.upsert_tld("app", Some(t("2026-01-01T00:00:00Z")))
            .await
            .unwrap();
        db.upsert_tld("dev", None).await.unwrap();
        db.upsert_tld("zone", Some(t("2027-01-01T00:00:00Z")))
            .await
            .unwrap();

        let tlds = db
            .enrolled_tlds_as_of(t("2026-06-01T00:00:00Z"))
            .await
            .unwrap();
        assert_eq!(tlds, vec!["app".to_string()]);
    }
}
