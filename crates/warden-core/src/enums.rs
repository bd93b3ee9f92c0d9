//! Closed enums for block-list state.
//!
//! All enums serialize as `SCREAMING_SNAKE_CASE` — the same spelling is used
//! in SQL storage, in discrepancy reports, and in change-record lines, so a
//! value reads identically everywhere it appears.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Reason
// ---------------------------------------------------------------------------

/// Why a domain matching a blocked label is nonetheless permitted to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    /// The domain is currently registered.
    Registered,
    /// The domain name is on the reserved-names list.
    Reserved,
    /// The label is not a valid representation under any IDN table.
    Invalid,
}

impl Reason {
    /// Return the string representation used in SQL storage and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Registered => "REGISTERED",
            Self::Reserved => "RESERVED",
            Self::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reason {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "REGISTERED" => Ok(Self::Registered),
            "RESERVED" => Ok(Self::Reserved),
            "INVALID" => Ok(Self::Invalid),
            other => Err(CoreError::UnknownReason {
                value: other.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// BlockListCategory
// ---------------------------------------------------------------------------

/// A distinct list category within one download of the authoritative feed.
///
/// The feed publishes each category as its own file; labels are deduplicated
/// across categories when a download is flattened into a label set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockListCategory {
    Block,
    BlockPlus,
}

impl BlockListCategory {
    /// Every category of the feed, in download order.
    pub const ALL: [Self; 2] = [Self::Block, Self::BlockPlus];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "BLOCK",
            Self::BlockPlus => "BLOCK_PLUS",
        }
    }
}

impl fmt::Display for BlockListCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// DownloadStage
// ---------------------------------------------------------------------------

/// Progress of one feed download cycle.
///
/// ```text
/// download → make_diff → apply_diff → done
///          → nop (checksums unchanged, nothing to apply)
/// ```
///
/// Only a job at [`DownloadStage::Done`] is eligible as the baseline for a
/// validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DownloadStage {
    Download,
    MakeDiff,
    ApplyDiff,
    Done,
    Nop,
}

impl DownloadStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Download => "DOWNLOAD",
            Self::MakeDiff => "MAKE_DIFF",
            Self::ApplyDiff => "APPLY_DIFF",
            Self::Done => "DONE",
            Self::Nop => "NOP",
        }
    }
}

impl fmt::Display for DownloadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadStage {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DOWNLOAD" => Ok(Self::Download),
            "MAKE_DIFF" => Ok(Self::MakeDiff),
            "APPLY_DIFF" => Ok(Self::ApplyDiff),
            "DONE" => Ok(Self::Done),
            "NOP" => Ok(Self::Nop),
            other => Err(CoreError::UnknownStage {
                value: other.to_string(),
            }),
        }
    }
}
