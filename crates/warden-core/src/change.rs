//! Change record of an unblockable domain.
//!
//! The download pipeline appends one serialized record per ledger transition
//! to a text log. Records are constructed transiently, never mutated, and
//! round-trip exactly through [`UnblockableDomainChange::serialize`] /
//! [`UnblockableDomainChange::deserialize`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::UnblockableDomain;
use crate::enums::Reason;
use crate::errors::CoreError;

/// The text used in place of an absent new reason when a record is
/// serialized.
///
/// Lexically distinct from every [`Reason`] name so that scanning the change
/// log can never confuse a deletion with a real reason.
const DELETE_REASON_PLACEHOLDER: &str = "IS_DELETE";

const FIELD_DELIMITER: char = ',';

/// An audit record of one transition to an [`UnblockableDomain`].
///
/// Holds the domain's prior state and the reason it transitions to;
/// a `None` new reason denotes removal from the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UnblockableDomainChange {
    pub unblockable: UnblockableDomain,
    pub new_reason: Option<Reason>,
}

impl UnblockableDomainChange {
    /// Record the addition of a new ledger entry.
    #[must_use]
    pub fn of_new(unblockable: UnblockableDomain) -> Self {
        let new_reason = Some(unblockable.reason);
        Self {
            unblockable,
            new_reason,
        }
    }

    /// Record a reason change of an existing ledger entry.
    #[must_use]
    pub const fn of_changed(unblockable: UnblockableDomain, new_reason: Reason) -> Self {
        Self {
            unblockable,
            new_reason: Some(new_reason),
        }
    }

    /// Record the removal of a ledger entry.
    #[must_use]
    pub const fn of_deleted(unblockable: UnblockableDomain) -> Self {
        Self {
            unblockable,
            new_reason: None,
        }
    }

    #[must_use]
    pub fn domain_name(&self) -> &str {
        &self.unblockable.domain_name
    }

    /// The entry as it looks after this change; `None` for a deletion.
    #[must_use]
    pub fn new_value(&self) -> Option<UnblockableDomain> {
        self.new_reason
            .map(|reason| UnblockableDomain::new(self.unblockable.domain_name.clone(), reason))
    }

    #[must_use]
    pub const fn is_delete(&self) -> bool {
        self.new_reason.is_none()
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.new_reason == Some(self.unblockable.reason)
    }

    #[must_use]
    pub const fn is_new_or_change(&self) -> bool {
        self.new_reason.is_some()
    }

    #[must_use]
    pub fn is_change_or_delete(&self) -> bool {
        !self.is_new()
    }

    /// Serialize to one delimiter-joined log line:
    /// `domainName,oldReason,newReasonOrPlaceholder`.
    #[must_use]
    pub fn serialize(&self) -> String {
        let new_reason = self
            .new_reason
            .map_or(DELETE_REASON_PLACEHOLDER, Reason::as_str);
        format!(
            "{}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{new_reason}",
            self.unblockable.domain_name,
            self.unblockable.reason.as_str(),
        )
    }

    /// Parse one log line produced by [`Self::serialize`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedChangeRecord`] when the line does not
    /// have three fields, and [`CoreError::UnknownReason`] when a reason
    /// field holds an unrecognized value.
    pub fn deserialize(text: &str) -> Result<Self, CoreError> {
        let mut fields = text.split(FIELD_DELIMITER);
        let (Some(domain_name), Some(old_reason), Some(new_reason), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(CoreError::MalformedChangeRecord {
                line: text.to_string(),
            });
        };
        let new_reason = if new_reason == DELETE_REASON_PLACEHOLDER {
            None
        } else {
            Some(new_reason.parse::<Reason>()?)
        };
        Ok(Self {
            unblockable: UnblockableDomain::new(domain_name, old_reason.parse::<Reason>()?),
            new_reason,
        })
    }
}
