//! Shared test fixtures for warden-db tests.

use chrono::{DateTime, Utc};
use warden_core::entities::UnblockableDomain;
use warden_core::enums::Reason;

use crate::WardenDb;
use crate::helpers::end_of_time;

/// Create an in-memory database with the full schema.
pub(crate) async fn test_db() -> WardenDb {
    WardenDb::open_local(":memory:").await.unwrap()
}

/// Parse an RFC 3339 literal.
pub(crate) fn t(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

pub(crate) async fn persist_blocked_label(db: &WardenDb, label: &str) {
    db.persist_blocked_label(label, t("2026-01-01T00:00:00Z"))
        .await
        .unwrap();
}

pub(crate) async fn persist_unblockable(db: &WardenDb, domain_name: &str, reason: Reason) {
    db.persist_unblockable_domain(
        &UnblockableDomain::new(domain_name, reason),
        t("2026-01-01T00:00:00Z"),
    )
    .await
    .unwrap();
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
