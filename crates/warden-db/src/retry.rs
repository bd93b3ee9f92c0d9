//! Transient database error retry logic.
//!
//! Provides automatic retry with exponential backoff for transient
//! `SQLite` contention errors (a writer holding the file lock while a
//! validation batch is being fetched). These resolve on their own within
//! milliseconds once the writer commits.
//!
//! Every statement the engine issues goes through this layer; the run
//! orchestrator relies on it when it reports success to its trigger even
//! after an internal failure — collaborator I/O has already been retried
//! here, so re-triggering the whole run would be redundant.

use std::time::Duration;

/// Configuration for retry behavior on transient database errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Delay before the retry following attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Detect transient `SQLite` contention errors.
///
/// The predicate is intentionally narrow to avoid retrying genuine SQL or
/// constraint errors.
#[must_use]
pub fn is_transient_error(e: &libsql::Error) -> bool {
    let msg = e.to_string();
    msg.contains("database is locked") || msg.contains("database table is locked")
}
