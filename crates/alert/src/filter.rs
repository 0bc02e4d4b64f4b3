//! Decides which alerts cross a lead-time threshold this tick.
//!
//! Matching is exact equality on whole minutes remaining, not a
//! crossed-threshold comparison: the poll interval is assumed smaller
//! than the gap between consecutive configured lead times, so every
//! threshold is observed on one or a few consecutive ticks and dedup is
//! anchored on the ledger rather than on interval math. Shrinking the
//! lead-time granularity below the poll interval requires widening the
//! match to a range, not a point.

use chrono::{DateTime, Utc};

use spawnwatch_core::{AlertKey, NextOccurrenceMap};

use crate::ledger::AlertLedger;

/// One alert to deliver: a subject and the lead time it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Firing {
    pub subject: String,
    pub lead_minutes: u32,
}

/// Evaluate all occurrences for one subscriber group.
///
/// For each occurrence, whole minutes until spawn are compared against
/// the group's lead set; a match fires only if the ledger has no entry
/// for the key, and the key is recorded before the result is returned
/// so a single tick can never double-report. Occurrences already in the
/// past (a feed handing back an elapsed instant) are dropped silently.
pub fn evaluate(
    occurrences: &NextOccurrenceMap,
    now_utc: DateTime<Utc>,
    lead_minutes: &[u32],
    group_id: &str,
    ledger: &mut AlertLedger,
) -> Vec<Firing> {
    let mut firings = Vec::new();

    for (subject, instant) in occurrences {
        let minutes_until = (*instant - now_utc).num_seconds().div_euclid(60);
        if minutes_until < 0 {
            continue;
        }
        let minutes_until = minutes_until as u32;

        if !lead_minutes.contains(&minutes_until) {
            continue;
        }

        let key = AlertKey::new(group_id, subject.clone(), minutes_until);
        if ledger.has_fired(&key) {
            continue;
        }
        // Record before returning so the key cannot fire twice.
        ledger.record_fired(&key, now_utc);

        firings.push(Firing {
            subject: subject.clone(),
            lead_minutes: minutes_until,
        });
    }

    firings
}
