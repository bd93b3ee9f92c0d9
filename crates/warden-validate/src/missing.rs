//! Detection of ledger entries that should exist but do not.
//!
//! The ledger check (`unblockables.rs`) catches entries with wrong reasons;
//! this module catches the inverse gap: registered or reserved domains that
//! match a blocked label yet have no plausible ledger entry at all.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use warden_core::entities::UnblockableDomain;
use warden_core::enums::Reason;

use crate::error::ValidateError;
use crate::report::example_list;
use crate::run::BlockListValidator;

fn label_of(domain_name: &str) -> &str {
    domain_name
        .split_once('.')
        .map_or(domain_name, |(label, _)| label)
}

impl BlockListValidator<'_> {
    /// Run both missing-entry sub-checks against one "now".
    pub(crate) async fn check_missing_unblockables(&self) -> Result<Vec<String>, ValidateError> {
        let now = self.clock.now();
        let mut discrepancies = self.check_missing_reserved_unblockables(now).await?;
        discrepancies.extend(self.check_missing_registered_unblockables(now).await?);
        Ok(discrepancies)
    }

    /// Every reserved name whose label is blocked must have a ledger entry
    /// with reason REGISTERED or RESERVED.
    ///
    /// Reserved names are processed in chunks of the batch size; per chunk,
    /// one bulk lookup resolves which labels are blocked and one resolves
    /// the persisted entries.
    pub(crate) async fn check_missing_reserved_unblockables(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ValidateError> {
        let reserved = self.db.reserved_names_as_of(now).await?;
        let mut missing = Vec::new();
        let mut wrong_reason = Vec::new();

        for chunk in reserved.chunks(self.batch_size as usize) {
            let labels: Vec<String> = chunk
                .iter()
                .map(|name| label_of(name).to_string())
                .collect();
            let blocked = self.db.blocked_among(&labels).await?;
            let candidates: Vec<&String> = chunk
                .iter()
                .filter(|name| blocked.contains(label_of(name)))
                .collect();
            if candidates.is_empty() {
                continue;
            }

            let candidate_labels: HashSet<String> = candidates
                .iter()
                .map(|name| label_of(name).to_string())
                .collect();
            let persisted: HashMap<String, UnblockableDomain> = self
                .db
                .unblockables_by_labels(&candidate_labels)
                .await?
                .into_iter()
                .map(|unblockable| (unblockable.domain_name.clone(), unblockable))
                .collect();

            for name in candidates {
                match persisted.get(name.as_str()) {
                    None => missing.push(name.clone()),
                    Some(unblockable)
                        if !matches!(
                            unblockable.reason,
                            Reason::Registered | Reason::Reserved
                        ) =>
                    {
                        wrong_reason.push(format!("{name} (found {})", unblockable.reason));
                    }
                    Some(_) => {}
                }
            }
        }

        let mut discrepancies = Vec::new();
        if !missing.is_empty() {
            let message = format!(
                "Found {} reserved domains missing an unblockable entry. Examples: [{}]",
                missing.len(),
                example_list(&missing)
            );
            tracing::info!("{message}");
            discrepancies.push(message);
        }
        if !wrong_reason.is_empty() {
            let message = format!(
                "Found {} reserved domains with a wrong unblockable reason. Examples: [{}]",
                wrong_reason.len(),
                example_list(&wrong_reason)
            );
            tracing::info!("{message}");
            discrepancies.push(message);
        }
        Ok(discrepancies)
    }

    /// Every registered domain under an enrolled TLD whose label is blocked
    /// must have a ledger entry with reason REGISTERED.
    ///
    /// Domains created inside the staleness window are given time to
    /// propagate before being flagged.
    pub(crate) async fn check_missing_registered_unblockables(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, ValidateError> {
        let staleness_threshold = now - self.max_staleness;
        let mut offenders = Vec::new();
        for tld in self.db.enrolled_tlds_as_of(now).await? {
            let missed = self.db.missed_registered_unblockables(&tld, now).await?;
            offenders.extend(
                missed
                    .into_iter()
                    .filter(|span| span.creation_time < staleness_threshold)
                    .map(|span| span.domain_name),
            );
        }
        if offenders.is_empty() {
            return Ok(Vec::new());
        }
        let message = format!(
            "Found {} registered domains missing or not recorded as REGISTERED. Examples: [{}]",
            offenders.len(),
            example_list(&offenders)
        );
        tracing::info!("{message}");
        Ok(vec![message])
    }
}
