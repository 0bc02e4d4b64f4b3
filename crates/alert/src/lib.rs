//! Alert dedup and subscriber state.
//!
//! This crate provides:
//! - `AlertLedger` — durable set of fired-alert keys with a retention
//!   sweep, the anchor for at-most-once firing
//! - `evaluate` — the fire filter deciding which (subject, lead) pairs
//!   cross a configured threshold this tick
//! - `SubscriberStore` — per-group delivery target and live-message
//!   reference, persisted write-through

pub mod filter;
pub mod ledger;
mod store;
pub mod subscribers;

pub use filter::{evaluate, Firing};
pub use ledger::AlertLedger;
pub use subscribers::{SubscriberGroup, SubscriberStore};
