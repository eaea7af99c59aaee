//! DST transition policies for resolving a slot's local start to an instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Policy for slots whose local start time falls in a DST gap
/// (e.g. 02:30 on a spring-forward night).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Drop slots that start inside the gap.
    Skip,
    /// Read the wall-clock time with the offset in force before the gap,
    /// which lands the slot the gap's length later on the new clock.
    #[default]
    ShiftForward,
}

/// Resolve a local wall-clock datetime in `tz` to a UTC instant.
///
/// Ambiguous times (fall back) resolve to the earlier instant. Nonexistent
/// times follow `policy`; `None` means the slot should not be offered.
pub fn resolve_local(local: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => match policy {
            DstPolicy::Skip => None,
            DstPolicy::ShiftForward => {
                // Gaps in tzdb are at most a few hours; the wall clock three
                // hours earlier is on the pre-transition offset.
                let before = tz
                    .from_local_datetime(&(local - Duration::hours(3)))
                    .earliest()?;
                let offset = before.offset().fix();
                let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
                Some(utc.and_utc())
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn ordinary_time_resolves_once() {
        let tz: Tz = "America/New_York".parse().unwrap();
        let utc = resolve_local(local(2026, 3, 16, 9, 0), tz, DstPolicy::Skip).unwrap();
        // EDT is UTC-4 after 2026-03-08.
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 3, 16, 13, 0, 0).unwrap());
    }

    #[test]
    fn gap_time_is_skipped_or_shifted() {
        // US spring forward 2026-03-08: 02:00 EST jumps to 03:00 EDT.
        let tz: Tz = "America/New_York".parse().unwrap();
        let gap = local(2026, 3, 8, 2, 30);

        assert_eq!(resolve_local(gap, tz, DstPolicy::Skip), None);

        let shifted = resolve_local(gap, tz, DstPolicy::ShiftForward).unwrap();
        // 02:30 read as EST (UTC-5) is 07:30Z, which is 03:30 EDT.
        assert_eq!(shifted, Utc.with_ymd_and_hms(2026, 3, 8, 7, 30, 0).unwrap());
    }

    #[test]
    fn ambiguous_time_takes_earliest() {
        // US fall back 2026-11-01: 01:30 occurs twice, first in EDT (UTC-4).
        let tz: Tz = "America/New_York".parse().unwrap();
        let utc = resolve_local(local(2026, 11, 1, 1, 30), tz, DstPolicy::Skip).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2026, 11, 1, 5, 30, 0).unwrap());
    }
}
