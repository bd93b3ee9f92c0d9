//! Helper for draining large tables in batches.
//!
//! A [`BatchIter`] yields a lazy, forward-only sequence of bounded-size
//! batches over a table with a single totally-ordered key column. Each batch
//! is fetched inside its own short snapshot transaction, so a batch reflects
//! one consistent point-in-time view even though different batches may see
//! different snapshots — the table may mutate between batches. That trade-off
//! keeps memory and transaction footprint bounded: no long-lived transaction
//! starves concurrent writers, and no full-table load sits in memory.
//!
//! The drain must not run inside a transaction; nesting would either reuse
//! the enclosing transaction's stale snapshot or pile up transactions
//! without bound, so it fails fast instead.

use crate::error::DatabaseError;
use crate::{Snapshot, WardenDb};

use warden_core::entities::UnblockableDomain;
use warden_core::enums::Reason;

/// Position in the ordered key space of a drain.
///
/// The first page and "no cursor yet" are distinct states, so this is a
/// tagged variant rather than an optional key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor<K> {
    /// Before the smallest key.
    Start,
    /// Strictly after the given key.
    After(K),
}

/// A table (or projection) that can be drained in key order.
///
/// Implementations declare their key columns statically and fetch pages
/// themselves; no runtime metamodel is consulted.
#[allow(async_fn_in_trait)]
pub trait BatchSource {
    type Item: Send;
    type Key: Clone + Send + Sync;

    /// Primary-key columns of the backing table, as the schema declares them.
    fn key_columns(&self) -> &'static [&'static str];

    /// The ordering key of one fetched item.
    fn ordering_key(&self, item: &Self::Item) -> Self::Key;

    /// Fetch up to `limit` items strictly after `cursor`, in ascending key
    /// order, inside the given snapshot.
    async fn fetch_after(
        &self,
        snapshot: &Snapshot<'_>,
        cursor: &Cursor<Self::Key>,
        limit: u32,
    ) -> Result<Vec<Self::Item>, DatabaseError>;
}

/// Lazy batch sequence over a [`BatchSource`].
///
/// Yields `ceil(M/N)` non-empty batches for a table of M rows and batch size
/// N; their concatenation is the table's content in ascending key order at
/// the respective snapshot times. The sequence is forward-only and cannot be
/// restarted.
pub struct BatchIter<'a, S: BatchSource> {
    db: &'a WardenDb,
    source: S,
    batch_size: u32,
    cursor: Cursor<S::Key>,
    done: bool,
}

impl<'a, S: BatchSource> BatchIter<'a, S> {
    /// Create a drain over `source` with the given batch size.
    ///
    /// # Errors
    ///
    /// - [`DatabaseError::Unsupported`] when the source's primary key spans
    ///   multiple columns — iterating such a table on one column would
    ///   silently skip or repeat rows.
    /// - [`DatabaseError::InvalidArgument`] when `batch_size` is zero.
    /// - [`DatabaseError::IllegalState`] when the handle is already inside a
    ///   transaction.
    pub fn new(db: &'a WardenDb, source: S, batch_size: u32) -> Result<Self, DatabaseError> {
        if source.key_columns().len() != 1 {
            return Err(DatabaseError::Unsupported(format!(
                "batch iteration requires a single-column key, got ({})",
                source.key_columns().join(", ")
            )));
        }
        if batch_size == 0 {
            return Err(DatabaseError::InvalidArgument(
                "batch_size must be positive".to_string(),
            ));
        }
        if db.in_transaction() {
            return Err(DatabaseError::IllegalState(
                "batch iteration cannot be nested in a transaction".to_string(),
            ));
        }
        Ok(Self {
            db,
            source,
            batch_size,
            cursor: Cursor::Start,
            done: false,
        })
    }

    /// Fetch the next batch, or `None` when the table is drained.
    ///
    /// A batch shorter than the batch size ends the sequence; it is still
    /// returned in full.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::IllegalState`] when called inside a
    /// transaction, or any fetch error from the source.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<S::Item>>, DatabaseError> {
        if self.done {
            return Ok(None);
        }
        let snapshot = self.db.begin_snapshot().await?;
        let fetched = self
            .source
            .fetch_after(&snapshot, &self.cursor, self.batch_size)
            .await;
        let finished = snapshot.rollback().await;
        let items = fetched?;
        finished?;

        if (items.len() as u64) < u64::from(self.batch_size) {
            self.done = true;
        }
        match items.last() {
            Some(last) => self.cursor = Cursor::After(self.source.ordering_key(last)),
            None => return Ok(None),
        }
        Ok(Some(items))
    }
}

/// Drain of `blocked_label`, yielding label text in ascending label order.
pub struct BlockedLabelSource;

impl BatchSource for BlockedLabelSource {
    type Item = String;
    type Key = String;

    fn key_columns(&self) -> &'static [&'static str] {
        &["label"]
    }

    fn ordering_key(&self, item: &Self::Item) -> Self::Key {
        item.clone()
    }

    async fn fetch_after(
        &self,
        snapshot: &Snapshot<'_>,
        cursor: &Cursor<Self::Key>,
        limit: u32,
    ) -> Result<Vec<Self::Item>, DatabaseError> {
        let mut rows = match cursor {
            Cursor::Start => {
                snapshot
                    .query(
                        "SELECT label FROM blocked_label ORDER BY label LIMIT ?1",
                        libsql::params![i64::from(limit)],
                    )
                    .await?
            }
            Cursor::After(label) => {
                snapshot
                    .query(
                        "SELECT label FROM blocked_label WHERE label > ?1 \
                         ORDER BY label LIMIT ?2",
                        libsql::params![label.as_str(), i64::from(limit)],
                    )
                    .await?
            }
        };
        let mut labels = Vec::new();
        while let Some(row) = rows.next().await? {
            labels.push(row.get::<String>(0)?);
        }
        Ok(labels)
    }
}

/// Drain of `unblockable_domain`, yielding ledger entries in ascending
/// domain-name order.
pub struct UnblockableDomainSource;

impl BatchSource for UnblockableDomainSource {
    type Item = UnblockableDomain;
    type Key = String;

    fn key_columns(&self) -> &'static [&'static str] {
        &["domain_name"]
    }

    fn ordering_key(&self, item: &Self::Item) -> Self::Key {
        item.domain_name.clone()
    }

    async fn fetch_after(
        &self,
        snapshot: &Snapshot<'_>,
        cursor: &Cursor<Self::Key>,
        limit: u32,
    ) -> Result<Vec<Self::Item>, DatabaseError> {
        let mut rows = match cursor {
            Cursor::Start => {
                snapshot
                    .query(
                        "SELECT domain_name, reason FROM unblockable_domain \
                         ORDER BY domain_name LIMIT ?1",
                        libsql::params![i64::from(limit)],
                    )
                    .await?
            }
            Cursor::After(domain_name) => {
                snapshot
                    .query(
                        "SELECT domain_name, reason FROM unblockable_domain \
                         WHERE domain_name > ?1 ORDER BY domain_name LIMIT ?2",
                        libsql::params![domain_name.as_str(), i64::from(limit)],
                    )
                    .await?
            }
        };
        let mut domains = Vec::new();
        while let Some(row) = rows.next().await? {
            let domain_name = row.get::<String>(0)?;
            let reason = row
                .get::<String>(1)?
                .parse::<Reason>()
                .map_err(|e| DatabaseError::Query(e.to_string()))?;
            domains.push(UnblockableDomain::new(domain_name, reason));
        }
        Ok(domains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{persist_blocked_label, persist_unblockable, test_db};
    use pretty_assertions::assert_eq;

    /// A deliberately composite-keyed source for the fail-fast contract.
    struct CompositeKeySource;

    impl BatchSource for CompositeKeySource {
        type Item = (String, String);
        type Key = (String, String);

        fn key_columns(&self) -> &'static [&'static str] {
            &["label", "tld"]
        }

        fn ordering_key(&self, item: &Self::Item) -> Self::Key {
            item.clone()
        }

        async fn fetch_after(
            &self,
            _snapshot: &Snapshot<'_>,
            _cursor: &Cursor<Self::Key>,
            _limit: u32,
        ) -> Result<Vec<Self::Item>, DatabaseError> {
            Ok(Vec::new())
        }
    }

    async fn drain_labels(db: &WardenDb, batch_size: u32) -> Vec<Vec<String>> {
        let mut iter = BatchIter::new(db, BlockedLabelSource, batch_size).unwrap();
        let mut batches = Vec::new();
        while let Some(batch) = iter.next_batch().await.unwrap() {
            batches.push(batch);
        }
        batches
    }

    #[tokio::test]
    async fn empty_table_yields_no_batches() {
        let db = test_db().await;
        assert!(drain_labels(&db, 3).await.is_empty());
    }

    #[tokio::test]
    async fn yields_ceil_m_over_n_batches_in_order() {
        let db = test_db().await;
        for label in ["a", "b", "c", "d", "e"] {
            persist_blocked_label(&db, label).await;
        }

        // M = 5, N = 2: three batches of 2, 2, 1.
        let batches = drain_labels(&db, 2).await;
        assert_eq!(
            batches,
            vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string(), "d".to_string()],
                vec!["e".to_string()],
            ]
        );
    }

    #[tokio::test]
    async fn exact_multiple_of_batch_size() {
        let db = test_db().await;
        for label in ["a", "b", "c", "d"] {
            persist_blocked_label(&db, label).await;
        }

        // M = 4, N = 2: exactly two batches, no trailing empty one.
        let batches = drain_labels(&db, 2).await;
        assert_eq!(batches.len(), 2);
        let all: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(all, vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn single_batch_when_n_exceeds_m() {
        let db = test_db().await;
        persist_blocked_label(&db, "only").await;

        let batches = drain_labels(&db, 100).await;
        assert_eq!(batches, vec![vec!["only".to_string()]]);
    }

    #[tokio::test]
    async fn concatenation_has_no_duplicates_or_omissions() {
        let db = test_db().await;
        let labels: Vec<String> = (0..23).map(|i| format!("label{i:02}")).collect();
        for label in &labels {
            persist_blocked_label(&db, label).await;
        }

        let batches = drain_labels(&db, 7).await;
        assert_eq!(batches.len(), 4); // ceil(23/7)
        let all: Vec<String> = batches.into_iter().flatten().collect();
        assert_eq!(all, labels);
    }

    #[tokio::test]
    async fn unblockable_source_parses_reasons() {
        let db = test_db().await;
        persist_unblockable(&db, "a.app", Reason::Registered).await;
        persist_unblockable(&db, "b.app", Reason::Invalid).await;

        let mut iter = BatchIter::new(&db, UnblockableDomainSource, 10).unwrap();
        let batch = iter.next_batch().await.unwrap().unwrap();
        assert_eq!(
            batch,
            vec![
                UnblockableDomain::new("a.app", Reason::Registered),
                UnblockableDomain::new("b.app", Reason::Invalid),
            ]
        );
        assert!(iter.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn composite_key_is_unsupported() {
        let db = test_db().await;
        let err = BatchIter::new(&db, CompositeKeySource, 10).err().unwrap();
        assert!(matches!(err, DatabaseError::Unsupported(_)));
    }

    #[tokio::test]
    async fn zero_batch_size_is_rejected() {
        let db = test_db().await;
        let err = BatchIter::new(&db, BlockedLabelSource, 0).err().unwrap();
        assert!(matches!(err, DatabaseError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn construction_inside_transaction_fails_fast() {
        let db = test_db().await;
        let snapshot = db.begin_snapshot().await.unwrap();
        let err = BatchIter::new(&db, BlockedLabelSource, 10).err().unwrap();
        assert!(matches!(err, DatabaseError::IllegalState(_)));
        snapshot.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn traversal_inside_transaction_fails_fast() {
        let db = test_db().await;
        persist_blocked_label(&db, "a").await;

        let mut iter = BatchIter::new(&db, BlockedLabelSource, 10).unwrap();
        let snapshot = db.begin_snapshot().await.unwrap();
        let err = iter.next_batch().await.unwrap_err();
        assert!(matches!(err, DatabaseError::IllegalState(_)));
        snapshot.rollback().await.unwrap();

        // Usable again once the enclosing transaction is gone.
        let batch = iter.next_batch().await.unwrap().unwrap();
        assert_eq!(batch, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn rows_inserted_between_batches_after_cursor_are_seen() {
        let db = test_db().await;
        for label in ["b", "d"] {
            persist_blocked_label(&db, label).await;
        }

        let mut iter = BatchIter::new(&db, BlockedLabelSource, 1).unwrap();
        let first = iter.next_batch().await.unwrap().unwrap();
        assert_eq!(first, vec!["b".to_string()]);

        // "a" sorts before the cursor and is skipped; "c" after it and is not.
        persist_blocked_label(&db, "a").await;
        persist_blocked_label(&db, "c").await;

        let mut rest = Vec::new();
        while let Some(batch) = iter.next_batch().await.unwrap() {
            rest.extend(batch);
        }
        assert_eq!(rest, vec!["c".to_string(), "d".to_string()]);
    }
}
