//! Resolves a weekly recurrence to the next absolute UTC instant.
//!
//! The feed publishes times like `"Tue 18:15"` in a fixed reference
//! timezone. Resolution builds the candidate local datetime in that zone
//! for the current week and rolls forward seven days when the candidate
//! has already elapsed. The zone's UTC offset is taken at the candidate
//! instant, so results stay correct across daylight-saving transitions.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use spawnwatch_core::RecurrenceSpec;

/// Next instant `> now` matching the recurrence, always within
/// `(now, now + 7 days]`.
///
/// A candidate landing exactly on the current minute counts as already
/// passed and rolls to next week; ties resolve to the future occurrence,
/// never the one about to elapse this instant.
pub fn next_occurrence(spec: &RecurrenceSpec, now: DateTime<Tz>) -> DateTime<Utc> {
    let tz = now.timezone();

    let delta_days = (i64::from(spec.weekday().num_days_from_monday())
        - i64::from(now.weekday().num_days_from_monday()))
    .rem_euclid(7);

    let date = now.date_naive() + Duration::days(delta_days);
    let naive = date
        .and_hms_opt(spec.hour(), spec.minute(), 0)
        .expect("hour and minute validated by RecurrenceSpec");

    let mut candidate = resolve_local(&tz, naive);
    if candidate <= now {
        candidate = resolve_local(&tz, naive + Duration::days(7));
    }

    candidate.with_timezone(&Utc)
}

/// Map a naive local datetime into the zone.
///
/// Ambiguous wall-clock times (the repeated fall-back hour) take the
/// earlier offset. Nonexistent times (the spring-forward gap) shift one
/// hour forward, landing just past the transition.
fn resolve_local(tz: &Tz, naive: NaiveDateTime) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(earlier, _) => earlier,
        LocalResult::None => match tz.from_local_datetime(&(naive + Duration::hours(1))) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(earlier, _) => earlier,
            // Unreachable for real tz data; interpret as UTC rather than panic.
            LocalResult::None => tz.from_utc_datetime(&naive),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use chrono_tz::US::Pacific;

    fn spec(weekday: Weekday, hour: u32, minute: u32) -> RecurrenceSpec {
        RecurrenceSpec::new(weekday, hour, minute).unwrap()
    }

    /// 2026-06-02 is a Tuesday, well clear of DST transitions.
    fn tuesday_at(hour: u32, minute: u32, second: u32) -> DateTime<Tz> {
        Pacific
            .with_ymd_and_hms(2026, 6, 2, hour, minute, second)
            .unwrap()
    }

    #[test]
    fn same_day_future_time_resolves_this_week() {
        let now = tuesday_at(18, 0, 0);
        let instant = next_occurrence(&spec(Weekday::Tue, 18, 15), now);
        assert_eq!(instant - now.with_timezone(&Utc), Duration::minutes(15));
    }

    #[test]
    fn exact_current_minute_rolls_to_next_week() {
        let now = tuesday_at(18, 15, 0);
        let instant = next_occurrence(&spec(Weekday::Tue, 18, 15), now);
        assert_eq!(instant - now.with_timezone(&Utc), Duration::days(7));
    }

    #[test]
    fn elapsed_seconds_within_minute_roll_to_next_week() {
        let now = tuesday_at(18, 15, 30);
        let instant = next_occurrence(&spec(Weekday::Tue, 18, 15), now);
        assert!(instant > now.with_timezone(&Utc) + Duration::days(6));
    }

    #[test]
    fn earlier_weekday_wraps_forward() {
        // Monday 10:00 seen from Tuesday resolves six days out.
        let now = tuesday_at(12, 0, 0);
        let instant = next_occurrence(&spec(Weekday::Mon, 10, 0), now);
        let now_utc = now.with_timezone(&Utc);
        assert!(instant > now_utc);
        assert_eq!(instant - now_utc, Duration::days(6) - Duration::hours(2));
    }

    #[test]
    fn result_is_bounded_by_one_week() {
        let now = tuesday_at(9, 30, 45);
        for weekday in [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ] {
            for (h, m) in [(0, 0), (9, 30), (12, 0), (23, 59)] {
                let instant = next_occurrence(&spec(weekday, h, m), now);
                let now_utc = now.with_timezone(&Utc);
                assert!(instant > now_utc, "{weekday} {h:02}:{m:02} not in future");
                assert!(
                    instant <= now_utc + Duration::days(7),
                    "{weekday} {h:02}:{m:02} beyond one week"
                );
            }
        }
    }

    #[test]
    fn resolution_is_deterministic() {
        let now = tuesday_at(18, 0, 0);
        let s = spec(Weekday::Thu, 22, 0);
        assert_eq!(next_occurrence(&s, now), next_occurrence(&s, now));
    }

    #[test]
    fn spring_forward_gap_shifts_one_hour() {
        // US/Pacific springs forward 2026-03-08 02:00 -> 03:00. A 02:30
        // wall-clock time never exists that Sunday; it resolves to 03:30
        // PDT, i.e. 10:30 UTC.
        let now = Pacific.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        let instant = next_occurrence(&spec(Weekday::Sun, 2, 30), now);
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 3, 8, 10, 30, 0).unwrap());
    }

    #[test]
    fn offset_is_taken_at_the_target_instant() {
        // Saturday before the spring-forward transition is UTC-8; the
        // following Monday is UTC-7. Monday 10:00 local must convert with
        // the Monday offset, not Saturday's.
        let now = Pacific.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        let instant = next_occurrence(&spec(Weekday::Mon, 10, 0), now);
        assert_eq!(instant, Utc.with_ymd_and_hms(2026, 3, 9, 17, 0, 0).unwrap());
    }
}
