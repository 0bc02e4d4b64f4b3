//! Durable ledger of fired alerts.
//!
//! Maps the stable string encoding of an [`AlertKey`] to the unix
//! timestamp it fired at. The fire filter consults this before emitting
//! and records immediately on emit, so an alert key fires at most once
//! within the retention window. A periodic sweep drops entries older
//! than the window; cardinality is bounded by
//! subjects x lead times x subscriber groups, so a linear scan is fine.

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use spawnwatch_core::AlertKey;

use crate::store::{read_json_or_default, write_json_atomic};

pub struct AlertLedger {
    path: PathBuf,
    /// Encoded alert key -> fired-at unix seconds.
    entries: HashMap<String, i64>,
}

impl AlertLedger {
    /// Load the ledger from disk; a missing file yields an empty ledger.
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = read_json_or_default(&path)?;
        Ok(Self { path, entries })
    }

    /// Empty in-memory ledger backed by `path` (nothing read from disk).
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: HashMap::new(),
        }
    }

    pub fn has_fired(&self, key: &AlertKey) -> bool {
        self.entries.contains_key(&key.encode())
    }

    pub fn record_fired(&mut self, key: &AlertKey, at: DateTime<Utc>) {
        self.entries.insert(key.encode(), at.timestamp());
    }

    /// Drop entries older than `retention`, returning how many were removed.
    pub fn sweep(&mut self, now: DateTime<Utc>, retention: Duration) -> usize {
        let cutoff = (now - retention).timestamp();
        let before = self.entries.len();
        self.entries.retain(|_, fired_at| *fired_at >= cutoff);
        let removed = before - self.entries.len();
        if removed > 0 {
            debug!(removed, remaining = self.entries.len(), "swept expired ledger entries");
        }
        removed
    }

    /// Write the full ledger snapshot to disk (atomic replace).
    pub fn persist(&self) -> anyhow::Result<()> {
        write_json_atomic(&self.path, &self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
