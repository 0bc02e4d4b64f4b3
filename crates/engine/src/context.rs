//! Shared engine state, explicitly owned and injected per tick.
//!
//! The raw feed cache has a single writer (the refresh loop) and is read
//! as a complete snapshot per poll tick. Ledger and subscriber mutations
//! are serialized behind their own locks; the evaluate-and-record step
//! holds the ledger lock for its whole duration.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use spawnwatch_alert::{AlertLedger, SubscriberStore};
use spawnwatch_core::{Config, RawSpawnEntry};
use spawnwatch_notify::Delivery;
use spawnwatch_schedule::SpawnFeed;

pub struct EngineContext {
    pub config: Config,
    /// Latest raw schedule snapshot; `None` until the first successful
    /// refresh.
    pub feed_cache: Arc<RwLock<Option<Vec<RawSpawnEntry>>>>,
    pub ledger: Arc<Mutex<AlertLedger>>,
    pub subscribers: Arc<Mutex<SubscriberStore>>,
    pub feed: Arc<dyn SpawnFeed>,
    pub delivery: Arc<dyn Delivery>,
}

impl EngineContext {
    pub fn new(
        config: Config,
        feed: Arc<dyn SpawnFeed>,
        delivery: Arc<dyn Delivery>,
        ledger: AlertLedger,
        subscribers: SubscriberStore,
    ) -> Self {
        Self {
            config,
            feed_cache: Arc::new(RwLock::new(None)),
            ledger: Arc::new(Mutex::new(ledger)),
            subscribers: Arc::new(Mutex::new(subscribers)),
            feed,
            delivery,
        }
    }
}
