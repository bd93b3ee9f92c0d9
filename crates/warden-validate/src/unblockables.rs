//! Per-record validation of the unblockable-domain ledger.
//!
//! Drains the ledger in batches; per batch, one bulk lookup resolves which
//! domain names are actively registered right now. Each record's expected
//! reason is recomputed from live truth and compared against the persisted
//! one. Mismatches near a registration or deletion event fall under the
//! staleness tolerance: truth lookups may be served by a read replica, and
//! the ledger itself is updated asynchronously, so a record is only wrong
//! once the mismatch has outlived the configured window.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use warden_core::entities::UnblockableDomain;
use warden_core::enums::Reason;
use warden_db::batch::{BatchIter, UnblockableDomainSource};

use crate::error::ValidateError;
use crate::run::BlockListValidator;

impl BlockListValidator<'_> {
    /// Find ledger entries whose persisted reason no longer matches live
    /// truth, one report line per unforgiven record.
    pub(crate) async fn check_wrongly_reported_unblockables(
        &self,
    ) -> Result<Vec<String>, ValidateError> {
        let mut discrepancies = Vec::new();
        let mut batches = BatchIter::new(self.db, UnblockableDomainSource, self.batch_size)?;
        while let Some(batch) = batches.next_batch().await? {
            let now = self.clock.now();
            let names: Vec<String> = batch
                .iter()
                .map(|unblockable| unblockable.domain_name.clone())
                .collect();
            let active = self.db.bulk_active_domains(&names, now).await?;
            let reserved = self.db.reserved_among(&names, now).await?;
            for unblockable in &batch {
                if let Some(discrepancy) = self
                    .verify_still_unblockable(unblockable, &active, &reserved, now)
                    .await?
                {
                    discrepancies.push(discrepancy);
                }
            }
        }
        Ok(discrepancies)
    }

    async fn verify_still_unblockable(
        &self,
        unblockable: &UnblockableDomain,
        active: &HashMap<String, String>,
        reserved: &HashSet<String>,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, ValidateError> {
        let is_registered = active.contains_key(&unblockable.domain_name);
        let is_reserved = reserved.contains(&unblockable.domain_name);
        let is_invalid = !self.idn.is_valid(unblockable.label());

        let expected = if is_registered {
            Some(Reason::Registered)
        } else if is_reserved {
            Some(Reason::Reserved)
        } else if is_invalid {
            Some(Reason::Invalid)
        } else {
            None
        };
        if expected == Some(unblockable.reason) {
            return Ok(None);
        }
        // Only mismatches next to a registration or deletion event can be
        // propagation lag; RESERVED/INVALID disagreements are never forgiven.
        if (is_registered || unblockable.reason == Reason::Registered)
            && self
                .is_staleness_allowed(&unblockable.domain_name, is_registered, now)
                .await?
        {
            return Ok(None);
        }
        Ok(Some(format!(
            "{}: should be {}, found {}",
            unblockable.domain_name,
            expected.map_or("BLOCKABLE", Reason::as_str),
            unblockable.reason
        )))
    }

    /// Whether a mismatch is explainable by a recent lifecycle transition.
    ///
    /// `is_new_domain` distinguishes the two shapes: the domain became
    /// registered and the ledger has not caught up, or the ledger claims
    /// REGISTERED and the deletion has not propagated. A deletion older than
    /// the tolerance window is a genuine staleness bug and is not forgiven.
    pub(crate) async fn is_staleness_allowed(
        &self,
        domain_name: &str,
        is_new_domain: bool,
        now: DateTime<Utc>,
    ) -> Result<bool, ValidateError> {
        let Some(span) = self.db.domain_life_span(domain_name).await? else {
            return Ok(false);
        };
        let allowed = if is_new_domain {
            span.creation_time + self.max_staleness > now
        } else {
            span.deletion_time < now && span.deletion_time + self.max_staleness > now
        };
        if allowed {
            tracing::warn!(
                domain = domain_name,
                "ledger mismatch forgiven inside staleness window"
            );
        }
        Ok(allowed)
    }
}
