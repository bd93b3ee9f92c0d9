//! # warden-validate
//!
//! The block-list reconciliation and validation engine.
//!
//! One run compares three views that must agree: the authoritative label
//! set of the most recent completed feed download, the persisted block-list
//! state, and the registry's live domain/reservation truth. Three checks run
//! in sequence:
//!
//! 1. **Label coverage** — set difference between downloaded and persisted
//!    labels, both directions.
//! 2. **Wrongly reported unblockables** — per ledger entry, recompute the
//!    expected reason from live truth, tolerating mismatches inside the
//!    staleness window around a registration or deletion event.
//! 3. **Missing unblockables** — reserved or registered domains matching a
//!    blocked label with no plausible ledger entry.
//!
//! The produced surface is a list of discrepancy strings plus one summary
//! notification. The run is gated by a best-effort registry-wide lock and
//! swallows internal failures by design (see [`run::Outcome`]).

pub mod error;
pub mod feed;
pub mod idn;
pub mod lock;
pub mod notify;
pub mod run;

mod labels;
mod missing;
mod report;
mod unblockables;

#[cfg(test)]
mod test_support;

pub use error::{FeedError, ValidateError};
pub use feed::{FeedStore, FsFeedStore};
pub use idn::{IdnTable, IdnValidator, LdhIdnValidator};
pub use lock::{DbRunLock, RunLock, VALIDATION_LOCK_RESOURCE};
pub use notify::{Notifier, TracingNotifier};
pub use run::{BlockListValidator, Outcome};
