//! Cross-cutting error types for Warden.
//!
//! Domain-specific errors (e.g., `DatabaseError`, `FeedError`) are defined in
//! their respective crates; this module covers the core types themselves.

use thiserror::Error;

/// Errors raised by core type parsing and construction.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A stored or serialized reason value matches no [`crate::enums::Reason`].
    #[error("Unknown unblockable reason: {value}")]
    UnknownReason { value: String },

    /// A stored stage value matches no [`crate::enums::DownloadStage`].
    #[error("Unknown download stage: {value}")]
    UnknownStage { value: String },

    /// A change-record line does not have the expected field count.
    #[error("Malformed change record: {line}")]
    MalformedChangeRecord { line: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
