//! Collapses a raw feed batch into one next occurrence per subject.

use chrono::DateTime;
use chrono_tz::Tz;
use tracing::warn;

use spawnwatch_core::{NextOccurrenceMap, RawSpawnEntry, RecurrenceSpec};

use crate::resolver::next_occurrence;

/// Resolve every raw entry against a single `now` snapshot and keep the
/// minimum instant per subject name.
///
/// A subject recurring several times per week contributes one candidate
/// per entry; only the soonest survives. Entries with malformed
/// recurrence text are dropped with a logged reason and never abort the
/// batch. Pure over its inputs plus the snapshot clock reading.
pub fn aggregate(entries: &[RawSpawnEntry], now: DateTime<Tz>) -> NextOccurrenceMap {
    let mut next = NextOccurrenceMap::new();

    for entry in entries {
        let spec = match RecurrenceSpec::parse(&entry.recurrence_text) {
            Ok(spec) => spec,
            Err(e) => {
                warn!(
                    subject = %entry.name,
                    recurrence = %entry.recurrence_text,
                    error = %e,
                    "dropping malformed spawn entry"
                );
                continue;
            }
        };

        let instant = next_occurrence(&spec, now);
        next.entry(entry.name.clone())
            .and_modify(|existing| {
                if instant < *existing {
                    *existing = instant;
                }
            })
            .or_insert(instant);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::US::Pacific;

    fn entry(name: &str, text: &str) -> RawSpawnEntry {
        RawSpawnEntry {
            name: name.to_string(),
            recurrence_text: text.to_string(),
        }
    }

    /// Tuesday 2026-06-02 18:00 Pacific.
    fn now() -> DateTime<Tz> {
        Pacific.with_ymd_and_hms(2026, 6, 2, 18, 0, 0).unwrap()
    }

    #[test]
    fn twice_weekly_subject_keeps_the_nearer_instant() {
        // From a Tuesday evening, Thursday 22:00 is nearer than next
        // Monday 10:00.
        let entries = vec![entry("Quint", "Mon 10:00"), entry("Quint", "Thu 22:00")];
        let map = aggregate(&entries, now());

        assert_eq!(map.len(), 1);
        let thursday = next_occurrence(&RecurrenceSpec::parse("Thu 22:00").unwrap(), now());
        assert_eq!(map["Quint"], thursday);
    }

    #[test]
    fn minimality_matches_individual_resolution() {
        let texts = ["Mon 10:00", "Wed 03:15", "Sat 23:45"];
        let entries: Vec<_> = texts.iter().map(|t| entry("Vell", t)).collect();
        let map = aggregate(&entries, now());

        let min = texts
            .iter()
            .map(|t| next_occurrence(&RecurrenceSpec::parse(t).unwrap(), now()))
            .min()
            .unwrap();
        assert_eq!(map["Vell"], min);
    }

    #[test]
    fn malformed_entry_is_dropped_without_aborting_the_batch() {
        let entries = vec![
            entry("Kzarka", "Wed 02:00"),
            entry("Garmoth", "not a time"),
            entry("Karanda", "Fri 09:30"),
        ];
        let map = aggregate(&entries, now());

        assert_eq!(map.len(), 2);
        assert!(map.contains_key("Kzarka"));
        assert!(map.contains_key("Karanda"));
        assert!(!map.contains_key("Garmoth"));
    }

    #[test]
    fn distinct_subjects_resolve_independently() {
        let entries = vec![entry("Kutum", "Tue 19:00"), entry("Nouver", "Tue 20:00")];
        let map = aggregate(&entries, now());

        assert_eq!(map.len(), 2);
        assert!(map["Kutum"] < map["Nouver"]);
    }

    #[test]
    fn empty_batch_yields_empty_map() {
        assert!(aggregate(&[], now()).is_empty());
    }
}
