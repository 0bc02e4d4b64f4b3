//! Poll-cycle engine wiring the pipeline together.
//!
//! This crate provides:
//! - `EngineContext` — explicitly owned shared state (feed cache, ledger,
//!   subscriber store, delivery handle)
//! - the refresh loop re-fetching raw schedule data on a slow cycle
//! - the poll tick: aggregate, filter, deliver, persist
//! - `Engine` — runs both loops until shutdown

pub mod context;
pub mod refresh;
pub mod runner;
pub mod tick;

pub use context::EngineContext;
pub use runner::Engine;
pub use tick::{run_tick, run_tick_at, TickOutcome};
