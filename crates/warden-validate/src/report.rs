//! Discrepancy message helpers.
//!
//! Reports stay human-scannable: a discrepancy class gets one message with
//! its cardinality and a bounded example list, never one line per element.

/// Example members quoted per discrepancy message.
pub(crate) const MAX_ERROR_EXAMPLES: usize = 10;

/// Join up to [`MAX_ERROR_EXAMPLES`] items for a message's example list.
pub(crate) fn example_list<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .take(MAX_ERROR_EXAMPLES)
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(",")
}
