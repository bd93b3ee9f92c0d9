//! Label-set reconciliation.
//!
//! Compares the label set of the most recent completed download against the
//! persisted label table. Either side may drift: labels the pipeline
//! silently dropped show up as missing, stale leftovers as unexpected.

use std::collections::BTreeSet;

use warden_core::enums::BlockListCategory;
use warden_db::batch::{BatchIter, BlockedLabelSource};

use crate::error::{FeedError, ValidateError};
use crate::report::example_list;
use crate::run::BlockListValidator;

/// Extract the label field of one list line: everything up to the first
/// delimiter.
pub(crate) fn parse_block_list_line(line: &str) -> Result<&str, FeedError> {
    match line.find(',') {
        Some(idx) if idx > 0 => Ok(&line[..idx]),
        _ => Err(FeedError::MalformedLine {
            line: line.to_string(),
        }),
    }
}

impl BlockListValidator<'_> {
    /// Compute `missing = downloaded − persisted` and
    /// `unexpected = persisted − downloaded`, one bounded message per
    /// non-empty side.
    pub(crate) async fn check_label_coverage(
        &self,
        job: &str,
    ) -> Result<Vec<String>, ValidateError> {
        let downloaded = self.fetch_downloaded_labels(job)?;
        let persisted = self.fetch_persisted_labels(self.batch_size).await?;

        let mut discrepancies = Vec::new();
        let missing: Vec<&String> = downloaded.difference(&persisted).collect();
        if !missing.is_empty() {
            let message = format!(
                "Found {} missing labels in the DB. Examples: [{}]",
                missing.len(),
                example_list(&missing)
            );
            tracing::info!("{message}");
            discrepancies.push(message);
        }
        let unexpected: Vec<&String> = persisted.difference(&downloaded).collect();
        if !unexpected.is_empty() {
            let message = format!(
                "Found {} unexpected labels in the DB. Examples: [{}]",
                unexpected.len(),
                example_list(&unexpected)
            );
            tracing::info!("{message}");
            discrepancies.push(message);
        }
        Ok(discrepancies)
    }

    /// Unique valid labels across all list categories of the download
    /// specified by `job`.
    pub(crate) fn fetch_downloaded_labels(&self, job: &str) -> Result<BTreeSet<String>, FeedError> {
        let mut labels = BTreeSet::new();
        for category in BlockListCategory::ALL {
            let lines = self.feed.read_list(job, category)?;
            for line in lines.skip(1) {
                let line = line?;
                let label = parse_block_list_line(&line)?;
                if !self.idn.is_valid(label) {
                    continue;
                }
                labels.insert(label.to_string());
            }
        }
        Ok(labels)
    }

    /// The persisted label table, drained in batches and flattened.
    pub(crate) async fn fetch_persisted_labels(
        &self,
        batch_size: u32,
    ) -> Result<BTreeSet<String>, ValidateError> {
        let mut labels = BTreeSet::new();
        let mut batches = BatchIter::new(self.db, BlockedLabelSource, batch_size)?;
        while let Some(batch) = batches.next_batch().await? {
            labels.extend(batch);
        }
        Ok(labels)
    }
}
