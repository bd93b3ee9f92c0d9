//! Run orchestration.
//!
//! One run anchors on the most recent completed feed download, executes the
//! three checks in sequence, and dispatches a single summary notification.
//! The run itself is not wrapped in a transaction: each batch fetch opens
//! its own snapshot, so different phases may observe slightly different
//! instants of the live registry. That is accepted; the staleness tolerance
//! absorbs it.

use chrono::Duration;
use warden_config::ValidationConfig;
use warden_core::clock::Clock;
use warden_db::WardenDb;

use crate::error::ValidateError;
use crate::feed::FeedStore;
use crate::idn::IdnValidator;
use crate::lock::RunLock;
use crate::notify::Notifier;

/// What one triggered run amounted to.
///
/// The trigger itself is always answered with "OK" — collaborator I/O is
/// already retried at a lower layer, so re-triggering a failed run would be
/// redundant. These flags exist so callers and tests can still tell the
/// cases apart without side-channel assertions on notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// The validation logic ran to completion.
    pub ran_successfully: bool,
    /// An internal failure was caught, logged, and notified.
    pub saw_internal_error: bool,
}

impl Outcome {
    const COMPLETED: Self = Self {
        ran_successfully: true,
        saw_internal_error: false,
    };
    const SKIPPED: Self = Self {
        ran_successfully: false,
        saw_internal_error: false,
    };
    const ABORTED: Self = Self {
        ran_successfully: false,
        saw_internal_error: true,
    };
}

/// Validates persisted block-list data against the most recent download and
/// the registry's live state.
pub struct BlockListValidator<'a> {
    pub(crate) db: &'a WardenDb,
    pub(crate) feed: &'a dyn FeedStore,
    pub(crate) idn: &'a dyn IdnValidator,
    pub(crate) notifier: &'a dyn Notifier,
    pub(crate) clock: &'a dyn Clock,
    pub(crate) batch_size: u32,
    pub(crate) max_staleness: Duration,
}

impl<'a> BlockListValidator<'a> {
    #[must_use]
    pub fn new(
        db: &'a WardenDb,
        feed: &'a dyn FeedStore,
        idn: &'a dyn IdnValidator,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
        config: &ValidationConfig,
    ) -> Self {
        Self {
            db,
            feed,
            idn,
            notifier,
            clock,
            batch_size: config.txn_batch_size,
            max_staleness: config.max_staleness(),
        }
    }

    /// Execute one run, swallowing every internal failure.
    ///
    /// A failure is logged and turned into a failure notification; it never
    /// escapes to the trigger.
    pub async fn run(&self) -> Outcome {
        match self.validate().await {
            Ok(_) => Outcome::COMPLETED,
            Err(error) => {
                tracing::warn!(error = %error, "failed to validate block lists");
                self.notifier
                    .send("Block list validation aborted", &error_chain(&error));
                Outcome::ABORTED
            }
        }
    }

    /// Execute one run gated by the registry-wide lock.
    ///
    /// A held lock skips the run and sends a low-urgency notification
    /// instead of the summary report.
    pub async fn run_guarded(&self, lock: &dyn RunLock) -> Outcome {
        match lock.try_acquire(self.clock.now()).await {
            Ok(true) => {
                let outcome = self.run().await;
                if let Err(error) = lock.release().await {
                    tracing::warn!(error = %error, "failed to release validation lock");
                }
                outcome
            }
            Ok(false) => {
                tracing::info!("block list validation skipped: lock held elsewhere");
                self.notifier.send(
                    "Block list validation skipped",
                    "Another block-list job holds the registry-wide lock.",
                );
                Outcome::SKIPPED
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to acquire validation lock");
                self.notifier
                    .send("Block list validation aborted", &error_chain(&error));
                Outcome::ABORTED
            }
        }
    }

    /// Performs validation of block-list data in the database.
    ///
    /// Returns the full discrepancy report; empty means clean. The summary
    /// notification is sent only when the report is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError`] on any collaborator failure; [`Self::run`]
    /// converts that into a failure notification.
    pub async fn validate(&self) -> Result<Vec<String>, ValidateError> {
        let Some(job) = self.db.most_recent_completed_job().await? else {
            tracing::info!("cannot validate: no completed block list download found");
            self.notifier.send(
                "Block list validation does not run: no completed download found",
                "",
            );
            return Ok(Vec::new());
        };
        tracing::info!(job = %job, "validating block list data with latest download");

        let mut discrepancies = Vec::new();
        discrepancies.extend(self.check_label_coverage(&job).await?);
        discrepancies.extend(self.check_wrongly_reported_unblockables().await?);
        discrepancies.extend(self.check_missing_unblockables().await?);

        if discrepancies.is_empty() {
            tracing::info!(job = %job, "block list validation completed: no errors found");
        } else {
            tracing::info!(
                job = %job,
                count = discrepancies.len(),
                "block list validation completed with errors"
            );
            let body = format!(
                "Most recent download is {job}.\n\n{}",
                discrepancies.join("\n")
            );
            self.notifier
                .send("Block list validation completed with errors", &body);
        }
        Ok(discrepancies)
    }
}

/// Render an error with its full cause chain for the failure notification.
fn error_chain(error: &ValidateError) -> String {
    let mut text = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        text.push_str(&format!("\nCaused by: {cause}"));
        source = cause.source();
    }
    text
}
