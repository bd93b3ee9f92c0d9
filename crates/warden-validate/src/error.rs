//! Error types for the validation engine.

use thiserror::Error;
use warden_core::enums::BlockListCategory;
use warden_db::error::DatabaseError;

/// Errors while reading the downloaded block-list feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A list line lacks the expected field delimiter. Aborts that feed
    /// read — a malformed file cannot be reconciled meaningfully.
    #[error("Malformed block list line: {line}")]
    MalformedLine { line: String },

    /// The list file for a job and category does not exist.
    #[error("Block list {category} not found for job {job}")]
    MissingList {
        job: String,
        category: BlockListCategory,
    },

    /// Underlying I/O failure.
    #[error("Feed I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from one validation run.
#[derive(Debug, Error)]
pub enum ValidateError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
