//! Shared test fixtures: an in-memory harness wiring every collaborator
//! seam to a controllable fake.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use warden_config::ValidationConfig;
use warden_core::clock::FakeClock;
use warden_core::entities::UnblockableDomain;
use warden_core::enums::{BlockListCategory, Reason};
use warden_db::WardenDb;
use warden_db::helpers::end_of_time;

use crate::error::FeedError;
use crate::feed::{FeedStore, LineIter};
use crate::idn::LdhIdnValidator;
use crate::notify::Notifier;
use crate::run::BlockListValidator;

/// Parse an RFC 3339 literal.
pub(crate) fn t(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// In-memory feed store seeded per test.
#[derive(Default)]
pub(crate) struct MemFeedStore {
    lists: Mutex<HashMap<(String, BlockListCategory), Vec<String>>>,
}

impl MemFeedStore {
    pub(crate) fn put(&self, job: &str, category: BlockListCategory, content: &str) {
        self.lists.lock().unwrap().insert(
            (job.to_string(), category),
            content.lines().map(String::from).collect(),
        );
    }
}

impl FeedStore for MemFeedStore {
    fn read_list(&self, job: &str, category: BlockListCategory) -> Result<LineIter<'_>, FeedError> {
        match self
            .lists
            .lock()
            .unwrap()
            .get(&(job.to_string(), category))
        {
            Some(lines) => Ok(Box::new(lines.clone().into_iter().map(Ok))),
            None => Err(FeedError::MissingList {
                job: job.to_string(),
                category,
            }),
        }
    }
}

/// Records every notification instead of delivering it.
#[derive(Default)]
pub(crate) struct CapturingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl CapturingNotifier {
    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for CapturingNotifier {
    fn send(&self, subject: &str, body: &str) {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
    }
}

/// One in-memory database plus fakes for every seam. Mutate `config` before
/// calling [`Harness::validator`] to change batch size or tolerance.
pub(crate) struct Harness {
    pub db: WardenDb,
    pub feed: MemFeedStore,
    pub idn: LdhIdnValidator,
    pub notifier: CapturingNotifier,
    pub clock: FakeClock,
    pub config: ValidationConfig,
}

impl Harness {
    pub(crate) async fn new() -> Self {
        Self {
            db: WardenDb::open_local(":memory:").await.unwrap(),
            feed: MemFeedStore::default(),
            idn: LdhIdnValidator,
            notifier: CapturingNotifier::default(),
            clock: FakeClock::new(t("2026-06-01T00:00:00Z")),
            config: ValidationConfig::default(),
        }
    }

    pub(crate) fn validator(&self) -> BlockListValidator<'_> {
        BlockListValidator::new(
            &self.db,
            &self.feed,
            &self.idn,
            &self.notifier,
            &self.clock,
            &self.config,
        )
    }

    pub(crate) async fn persist_blocked_label(&self, label: &str) {
        self.db
            .persist_blocked_label(label, t("2026-01-01T00:00:00Z"))
            .await
            .unwrap();
    }

    pub(crate) async fn persist_unblockable(&self, domain_name: &str, reason: Reason) {
        self.db
            .persist_unblockable_domain(
                &UnblockableDomain::new(domain_name, reason),
                t("2026-01-01T00:00:00Z"),
            )
            .await
            .unwrap();
    }
}

/// Seed an active domain: created at `creation_time`, never deleted.
pub(crate) async fn persist_active_domain(
    db: &WardenDb,
    domain_name: &str,
    creation_time: DateTime<Utc>,
) {
    let tld = domain_name.split_once('.').map_or("", |(_, tld)| tld);
    db.upsert_domain(
        &format!("{domain_name}-roid"),
        domain_name,
        tld,
        creation_time,
        end_of_time(),
    )
    .await
    .unwrap();
}

/// Seed a deleted domain with an explicit deletion instant.
pub(crate) async fn persist_deleted_domain(
    db: &WardenDb,
    domain_name: &str,
    creation_time: DateTime<Utc>,
    deletion_time: DateTime<Utc>,
) {
    let tld = domain_name.split_once('.').map_or("", |(_, tld)| tld);
    db.upsert_domain(
        &format!("{domain_name}-roid"),
        domain_name,
        tld,
        creation_time,
        deletion_time,
    )
    .await
    .unwrap();
}
