//! IDN-validity seam.
//!
//! A label is a legal domain label only if at least one of the registry's
//! internationalized-domain-name tables admits it. The engine never needs to
//! know which table — only whether the set is empty.

use std::collections::BTreeSet;
use std::fmt;

/// Identifier of one configured IDN table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdnTable {
    /// ASCII letter-digit-hyphen labels.
    Ldh,
    ExtendedLatin,
    Ja,
}

impl IdnTable {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ldh => "LDH",
            Self::ExtendedLatin => "EXTENDED_LATIN",
            Self::Ja => "JA",
        }
    }
}

impl fmt::Display for IdnTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decides which IDN tables admit a label.
pub trait IdnValidator: Send + Sync {
    /// The tables that admit `label`; empty means the label is invalid.
    fn valid_tables(&self, label: &str) -> BTreeSet<IdnTable>;

    fn is_valid(&self, label: &str) -> bool {
        !self.valid_tables(label).is_empty()
    }
}

/// Minimal production validator admitting classic letter-digit-hyphen
/// labels into the [`IdnTable::Ldh`] table.
///
/// Registries with real IDN tables plug in their own [`IdnValidator`]; this
/// default keeps pure-ASCII deployments working without table data.
#[derive(Debug, Clone, Copy, Default)]
pub struct LdhIdnValidator;

impl IdnValidator for LdhIdnValidator {
    fn valid_tables(&self, label: &str) -> BTreeSet<IdnTable> {
        let ldh = !label.is_empty()
            && label.len() <= 63
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
            && !label.starts_with('-')
            && !label.ends_with('-');
        if ldh {
            BTreeSet::from([IdnTable::Ldh])
        } else {
            BTreeSet::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_labels_are_valid() {
        let validator = LdhIdnValidator;
        assert!(validator.is_valid("example"));
        assert!(validator.is_valid("ex-ample-9"));
        assert!(validator.is_valid("0day"));
    }

    #[test]
    fn invalid_labels_have_no_tables() {
        let validator = LdhIdnValidator;
        assert!(!validator.is_valid(""));
        assert!(!validator.is_valid("-leading"));
        assert!(!validator.is_valid("trailing-"));
        assert!(!validator.is_valid("UPPER"));
        assert!(!validator.is_valid("münchen"));
        assert!(!validator.is_valid(&"a".repeat(64)));
    }
}
