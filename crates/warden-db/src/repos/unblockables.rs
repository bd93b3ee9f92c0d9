//! Unblockable-domain ledger repository.
//!
//! Entries are written by the download pipeline when a blocked label is
//! found to match an existing domain; the validation engine reads them and
//! recomputes whether each recorded reason still holds.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use warden_core::entities::UnblockableDomain;
use warden_core::enums::Reason;

use crate::WardenDb;
use crate::error::DatabaseError;
use crate::helpers::{fmt_time, placeholders};

impl WardenDb {
    /// Insert or update a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the write fails.
    pub async fn persist_unblockable_domain(
        &self,
        unblockable: &UnblockableDomain,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let created = fmt_time(created_at);
        self.execute_with(
            "INSERT INTO unblockable_domain (domain_name, label, tld, reason, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5) \
             ON CONFLICT(domain_name) DO UPDATE SET reason = excluded.reason",
            || {
                libsql::params![
                    unblockable.domain_name.as_str(),
                    unblockable.label(),
                    unblockable.tld(),
                    unblockable.reason.as_str(),
                    created.as_str()
                ]
            },
        )
        .await?;
        Ok(())
    }

    /// All ledger entries whose label is in the given set, in one keyed
    /// lookup.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError`] if the query fails or a stored reason is
    /// unparseable.
    pub async fn unblockables_by_labels(
        &self,
        labels: &HashSet<String>,
    ) -> Result<Vec<UnblockableDomain>, DatabaseError> {
        if labels.is_empty() {
            return Ok(Vec::new());
        }
        let sorted: Vec<&String> = {
            let mut sorted: Vec<&String> = labels.iter().collect();
            sorted.sort();
            sorted
        };
        let sql = format!(
            "SELECT domain_name, reason FROM unblockable_domain \
             WHERE label IN ({}) ORDER BY domain_name",
            placeholders(1, sorted.len())
        );
        let mut rows = self
            .query_with(&sql, || {
                libsql::params_from_iter(sorted.iter().map(|label| (*label).clone()))
            })
            .await?;
        let mut unblockables = Vec::new();
        while let Some(row) = rows.next().await? {
            let domain_name = row.get::<String>(0)?;
            let reason = row
                .get::<String>(1)?
                .parse::<Reason>()
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            unblockables.push(UnblockableDomain::new(domain_name, reason));
        }
        Ok(unblockables)
    }
}
