//! # warden-core
//!
//! Core types for Warden, the block-list reconciliation engine of the
//! registry backend.
//!
//! This crate provides the foundational types shared across all Warden
//! crates:
//! - Entity structs for block-list domain objects (blocked labels,
//!   unblockable domains, download jobs)
//! - Closed enums for reasons, feed categories, and download stages
//! - The unblockable-domain change record with its text serialization
//! - The clock seam used for staleness adjudication
//! - Cross-cutting error types

pub mod change;
pub mod clock;
pub mod entities;
pub mod enums;
pub mod errors;
