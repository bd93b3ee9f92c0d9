//! Entity structs for block-list domain objects.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{DownloadStage, Reason};

/// A domain matching a blocked label that is nonetheless permitted to exist,
/// with the reason why.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UnblockableDomain {
    /// Full domain name, `label.tld`.
    pub domain_name: String,
    pub reason: Reason,
}

impl UnblockableDomain {
    #[must_use]
    pub fn new(domain_name: impl Into<String>, reason: Reason) -> Self {
        Self {
            domain_name: domain_name.into(),
            reason,
        }
    }

    /// Build from a label and its TLD.
    #[must_use]
    pub fn of(label: &str, tld: &str, reason: Reason) -> Self {
        Self {
            domain_name: format!("{label}.{tld}"),
            reason,
        }
    }

    /// The portion of the domain name before its top-level suffix.
    #[must_use]
    pub fn label(&self) -> &str {
        self.domain_name
            .split_once('.')
            .map_or(self.domain_name.as_str(), |(label, _)| label)
    }

    /// The top-level suffix of the domain name.
    #[must_use]
    pub fn tld(&self) -> &str {
        self.domain_name
            .split_once('.')
            .map_or("", |(_, tld)| tld)
    }
}

/// One cycle of fetching the authoritative block-list feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DownloadJob {
    pub job_name: String,
    pub stage: DownloadStage,
    pub created_at: DateTime<Utc>,
}
