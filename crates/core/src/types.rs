//! Shared data model for the spawn alert engine.
//!
//! Raw feed entries carry a weekly recurrence as text (`"Tue 18:15"`,
//! interpreted in the feed's fixed reference timezone). Parsing normalizes
//! them into [`RecurrenceSpec`] values; the schedule crate resolves those
//! into concrete future instants.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// One raw record from the spawn feed: a subject name plus its weekly
/// recurrence in the reference timezone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSpawnEntry {
    pub name: String,
    /// `"<3-letter weekday> <HH:MM>"`, e.g. `"Tue 18:15"`.
    #[serde(rename = "time_str")]
    pub recurrence_text: String,
}

/// A weekly recurrence anchored to the reference timezone.
///
/// Fields are validated at construction, so consumers can build local
/// datetimes from `hour`/`minute` without re-checking ranges. Produced
/// fresh each time the raw feed is parsed; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSpec {
    weekday: Weekday,
    hour: u32,
    minute: u32,
}

impl RecurrenceSpec {
    pub fn new(weekday: Weekday, hour: u32, minute: u32) -> Result<Self, CoreError> {
        if hour > 23 {
            return Err(CoreError::recurrence(
                format!("{weekday} {hour:02}:{minute:02}"),
                "hour out of range",
            ));
        }
        if minute > 59 {
            return Err(CoreError::recurrence(
                format!("{weekday} {hour:02}:{minute:02}"),
                "minute out of range",
            ));
        }
        Ok(Self {
            weekday,
            hour,
            minute,
        })
    }

    /// Parse `"<3-letter weekday> <HH:MM>"` (e.g. `"Tue 18:15"`).
    ///
    /// Weekday names are matched case-insensitively via chrono; both
    /// `"Tue"` and `"Tuesday"` are accepted.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut parts = text.split_whitespace();
        let day = parts
            .next()
            .ok_or_else(|| CoreError::recurrence(text, "empty recurrence"))?;
        let hm = parts
            .next()
            .ok_or_else(|| CoreError::recurrence(text, "missing time of day"))?;
        if parts.next().is_some() {
            return Err(CoreError::recurrence(text, "trailing tokens"));
        }

        let weekday: Weekday = day
            .parse()
            .map_err(|_| CoreError::recurrence(text, format!("unknown weekday '{day}'")))?;

        let (h, m) = hm
            .split_once(':')
            .ok_or_else(|| CoreError::recurrence(text, "time must be HH:MM"))?;
        let hour: u32 = h
            .parse()
            .map_err(|_| CoreError::recurrence(text, format!("bad hour '{h}'")))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| CoreError::recurrence(text, format!("bad minute '{m}'")))?;

        Self::new(weekday, hour, minute).map_err(|_| {
            CoreError::recurrence(text, format!("time {hour:02}:{minute:02} out of range"))
        })
    }

    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }
}

impl fmt::Display for RecurrenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.weekday, self.hour, self.minute)
    }
}

/// Soonest upcoming instant per subject name. BTreeMap keeps composite
/// alert messages in a stable subject order.
pub type NextOccurrenceMap = BTreeMap<String, DateTime<Utc>>;

/// Unique identity of one alert firing: a subscriber group, a subject,
/// and a lead time in minutes. May fire at most once within the ledger's
/// retention window.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlertKey {
    pub group_id: String,
    pub subject: String,
    pub lead_minutes: u32,
}

impl AlertKey {
    pub fn new(group_id: impl Into<String>, subject: impl Into<String>, lead_minutes: u32) -> Self {
        Self {
            group_id: group_id.into(),
            subject: subject.into(),
            lead_minutes,
        }
    }

    /// Stable string encoding used as the ledger map key.
    pub fn encode(&self) -> String {
        format!("{}_{}_{}", self.group_id, self.subject, self.lead_minutes)
    }
}

impl fmt::Display for AlertKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_basic_recurrence() {
        let spec = RecurrenceSpec::parse("Tue 18:15").unwrap();
        assert_eq!(spec.weekday(), Weekday::Tue);
        assert_eq!(spec.hour(), 18);
        assert_eq!(spec.minute(), 15);
    }

    #[test]
    fn parse_is_case_insensitive_on_weekday() {
        let spec = RecurrenceSpec::parse("sun 00:00").unwrap();
        assert_eq!(spec.weekday(), Weekday::Sun);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(RecurrenceSpec::parse("").is_err());
        assert!(RecurrenceSpec::parse("Tue").is_err());
        assert!(RecurrenceSpec::parse("Xyz 10:00").is_err());
        assert!(RecurrenceSpec::parse("Tue 1000").is_err());
        assert!(RecurrenceSpec::parse("Tue 24:00").is_err());
        assert!(RecurrenceSpec::parse("Tue 18:60").is_err());
        assert!(RecurrenceSpec::parse("Tue 18:15 extra").is_err());
    }

    #[test]
    fn new_validates_ranges() {
        assert!(RecurrenceSpec::new(Weekday::Mon, 23, 59).is_ok());
        assert!(RecurrenceSpec::new(Weekday::Mon, 24, 0).is_err());
        assert!(RecurrenceSpec::new(Weekday::Mon, 0, 60).is_err());
    }

    #[test]
    fn alert_key_encoding_is_stable() {
        let key = AlertKey::new("g1", "Karanda", 30);
        assert_eq!(key.encode(), "g1_Karanda_30");
        assert_eq!(key.to_string(), key.encode());
    }

    #[test]
    fn raw_entry_deserializes_feed_field_names() {
        let entry: RawSpawnEntry =
            serde_json::from_str(r#"{"name": "Kzarka", "time_str": "Mon 10:00"}"#).unwrap();
        assert_eq!(entry.name, "Kzarka");
        assert_eq!(entry.recurrence_text, "Mon 10:00");
    }
}
