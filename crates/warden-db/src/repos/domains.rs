//! Registry-domain projection repository.
//!
//! The `domain` table is a replicated, read-mostly projection of the
//! registry's live domain state: one row per domain name carrying its most
//! recent lifecycle. A domain is active exactly when `deletion_time` lies in
//! the future; never-deleted domains carry the end-of-time sentinel.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::{fmt_time, parse_datetime, placeholders};

/// A registered domain's name plus its creation and deletion instants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainLifeSpan {
    pub domain_name: String,
    pub creation_time: DateTime<Utc>,
    pub deletion_time: DateTime<Utc>,
}

impl WardenDb {
    /// Insert or update one row of the domain projection (replication sink).
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the write fails.
    pub async fn upsert_domain(
        &self,
        repo_id: &str,
        domain_name: &str,
        tld: &str,
        creation_time: DateTime<Utc>,
        deletion_time: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let created = fmt_time(creation_time);
        let deleted = fmt_time(deletion_time);
        self.execute_with(
            "INSERT INTO domain (repo_id, domain_name, tld, creation_time, deletion_time) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(repo_id) DO UPDATE SET \
                 domain_name = excluded.domain_name, \
                 tld = excluded.tld, \
                 creation_time = excluded.creation_time, \
                 deletion_time = excluded.deletion_time",
            || {
                libsql::params![
                    repo_id,
                    domain_name,
                    tld,
                    created.as_str(),
                    deleted.as_str()
                ]
            },
        )
        .await?;
        Ok(())
    }

    /// Resolve which of the given domain names are actively registered as of
    /// `as_of`, in one keyed lookup.
    ///
    /// Returns a map from domain name to the domain's repository key.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn bulk_active_domains(
        &self,
        domain_names: &[String],
        as_of: DateTime<Utc>,
    ) -> Result<HashMap<String, String>, DatabaseError> {
        if domain_names.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!(
            "SELECT domain_name, repo_id FROM domain \
             WHERE domain_name IN ({}) AND deletion_time > ?{}",
            placeholders(1, domain_names.len()),
            domain_names.len() + 1
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
        let mut active = HashMap::new();
        while let Some(row) = rows.next().await? {
            active.insert(row.get::<String>(0)?, row.get::<String>(1)?);
        }
        Ok(active)
    }

    /// The authoritative creation and deletion instants of a domain, or
    /// `None` when the projection has no row for the name.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn domain_life_span(
        &self,
        domain_name: &str,
    ) -> Result<Option<DomainLifeSpan>, DatabaseError> {
        let mut rows = self
            .query_with(
                "SELECT domain_name, creation_time, deletion_time FROM domain \
                 WHERE domain_name = ?1",
                || libsql::params![domain_name],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(life_span_from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Active domains in `tld` whose label is blocked but that have no
    /// ledger entry with reason `REGISTERED`.
    ///
    /// One set-join per TLD, returning each offender's life span so the
    /// caller can apply its creation-time grace window.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails.
    pub async fn missed_registered_unblockables(
        &self,
        tld: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<DomainLifeSpan>, DatabaseError> {
        let now = fmt_time(now);
        let mut rows = self
            .query_with(
                "SELECT d.domain_name, d.creation_time, d.deletion_time \
                 FROM domain d \
                 JOIN blocked_label b ON d.domain_name = b.label || '.' || ?1 \
                 LEFT OUTER JOIN unblockable_domain u \
                     ON u.domain_name = d.domain_name AND u.reason = 'REGISTERED' \
                 WHERE d.tld = ?1 AND d.deletion_time > ?2 AND u.domain_name IS NULL \
                 ORDER BY d.domain_name",
                || libsql::params![tld, now.as_str()],
            )
            .await?;
        let mut missed = Vec::new();
        while let Some(row) = rows.next().await? {
            missed.push(life_span_from_row(&row)?);
        }
        Ok(missed)
    }
}

fn life_span_from_row(row: &libsql::Row) -> Result<DomainLifeSpan, DatabaseError> {
    Ok(DomainLifeSpan {
        domain_name: row.get::<String>(0)?,
        creation_time: parse_datetime(&row.get::<String>(1)?)?,
        deletion_time: parse_datetime(&row.get::<String>(2)?)?,
    })
}
