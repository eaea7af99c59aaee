//! Reduce recurring weekly availability by date-bound unavailability.
//!
//! For each date, the weekly windows for that weekday are refined by every
//! partial unavailability period in turn. A full-day period empties the date.
//! Windows from different weekly sources are not merged with each other; use
//! [`coalesce_windows`] when merged output is wanted.

use crate::error::Result;
use crate::model::{
    EffectiveDayAvailability, UnavailabilityKind, UnavailabilityPeriod, WeeklyAvailabilityWindow,
};
use crate::time::{day_of_week, DateRange, TimeRange};

/// Compute effective availability for every date in `range`, ascending.
///
/// All inputs are validated before any date is computed.
///
/// # Errors
/// Returns `SlotError::InvalidInterval` if a weekly window or partial
/// unavailability has `start >= end`, a weekly window's day of week is
/// outside `0..=6`, or an unavailability or the requested range is inverted.
pub fn compute_effective_availability(
    weekly_windows: &[WeeklyAvailabilityWindow],
    unavailability: &[UnavailabilityPeriod],
    range: DateRange,
) -> Result<Vec<EffectiveDayAvailability>> {
    let range = DateRange::new(range.start, range.end)?;
    for window in weekly_windows {
        window.validate()?;
    }
    for period in unavailability {
        period.validate()?;
    }

    Ok(range
        .days()
        .map(|date| {
            let weekday = day_of_week(date);
            let todays_windows = weekly_windows
                .iter()
                .filter(|w| w.day_of_week == weekday)
                .map(|w| TimeRange {
                    start: w.start_time,
                    end: w.end_time,
                });
            let todays_periods: Vec<&UnavailabilityPeriod> = unavailability
                .iter()
                .filter(|p| p.applies_to(date))
                .collect();

            EffectiveDayAvailability {
                date,
                available_windows: reduce_day(todays_windows, &todays_periods),
            }
        })
        .collect())
}

/// Effective windows for a single date from already-filtered inputs.
fn reduce_day(
    windows: impl Iterator<Item = TimeRange>,
    periods: &[&UnavailabilityPeriod],
) -> Vec<TimeRange> {
    if periods.iter().any(|p| p.is_full_day()) {
        return Vec::new();
    }

    let blocked: Vec<TimeRange> = periods
        .iter()
        .filter_map(|p| match p.kind {
            UnavailabilityKind::Partial(range) => Some(range),
            UnavailabilityKind::FullDay => None,
        })
        .collect();

    let mut available: Vec<TimeRange> = windows
        .flat_map(|window| subtract_all(window, &blocked))
        .collect();
    available.sort_by_key(|r| (r.start, r.end));
    available
}

/// Subtract each blocked range in turn from what is left of `window`.
fn subtract_all(window: TimeRange, blocked: &[TimeRange]) -> Vec<TimeRange> {
    blocked.iter().fold(vec![window], |surviving, block| {
        surviving
            .iter()
            .flat_map(|piece| piece.subtract(block))
            .collect()
    })
}

/// Merge overlapping or touching windows into a sorted, disjoint list.
pub fn coalesce_windows(windows: &[TimeRange]) -> Vec<TimeRange> {
    let mut sorted = windows.to_vec();
    sorted.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<TimeRange> = Vec::with_capacity(sorted.len());
    for range in sorted {
        if let Some(last) = merged.last_mut() {
            if range.start <= last.end {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }
    merged
}

/// Apply [`coalesce_windows`] to every day in place.
pub fn coalesce_days(days: &mut [EffectiveDayAvailability]) {
    for day in days {
        day.available_windows = coalesce_windows(&day.available_windows);
    }
}
