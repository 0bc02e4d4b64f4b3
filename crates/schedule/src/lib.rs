//! Weekly recurrence resolution and spawn aggregation.
//!
//! This crate provides:
//! - `next_occurrence` — resolves a weekly recurrence in the reference
//!   timezone to the next absolute UTC instant
//! - `aggregate` — collapses a raw feed batch into one soonest occurrence
//!   per subject
//! - `SpawnFeed` trait plus HTTP and static adapters for the raw feed
//!   collaborator boundary

pub mod aggregate;
pub mod feed;
pub mod resolver;

pub use aggregate::aggregate;
pub use feed::{FeedError, HttpFeed, SpawnFeed, StaticFeed};
pub use resolver::next_occurrence;
