//! Property-based tests for availability reduction and slot generation.
//!
//! These verify invariants that should hold for *any* well-formed input, not
//! just the scenarios in `pipeline_tests.rs`.

use availability_engine::discretizer::slot_capacity;
use availability_engine::{
    coalesce_windows, compute_effective_availability, generate_slots, DateRange,
    EffectiveDayAvailability, SlotContext, SlotParams, TimeOfDay, TimeRange, UnavailabilityPeriod,
    WeeklyAvailabilityWindow,
};
use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// A valid range on a 5-minute grid inside one day.
fn arb_range() -> impl Strategy<Value = TimeRange> {
    (0u16..288)
        .prop_flat_map(|start| (Just(start), (start + 1)..=288))
        .prop_map(|(start, end)| TimeRange {
            start: TimeOfDay::from_minutes(start * 5).unwrap(),
            end: TimeOfDay::from_minutes(end * 5).unwrap(),
        })
}

fn arb_weekly() -> impl Strategy<Value = WeeklyAvailabilityWindow> {
    (0u8..=6, arb_range()).prop_map(|(day, r)| WeeklyAvailabilityWindow {
        day_of_week: day,
        start_time: r.start,
        end_time: r.end,
    })
}

/// Dates in March 2026.
fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1u32..=31).prop_map(|d| NaiveDate::from_ymd_opt(2026, 3, d).unwrap())
}

fn arb_period() -> impl Strategy<Value = UnavailabilityPeriod> {
    (arb_date(), 0u64..5, any::<bool>(), arb_range()).prop_map(|(start, extra, full, r)| {
        let end = start + chrono::Days::new(extra);
        if full {
            UnavailabilityPeriod::full_day(start, end).unwrap()
        } else {
            UnavailabilityPeriod::partial(start, end, r.start, r.end).unwrap()
        }
    })
}

fn arb_params() -> impl Strategy<Value = SlotParams> {
    (5i64..=120, 0i64..=30).prop_map(|(duration, brk)| SlotParams::new(duration, brk, 0))
}

fn march() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
    )
    .unwrap()
}

fn config() -> ProptestConfig {
    ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Property 1: Reduction is deterministic
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn reduction_is_deterministic(
        windows in prop::collection::vec(arb_weekly(), 0..6),
        periods in prop::collection::vec(arb_period(), 0..6),
    ) {
        let first = compute_effective_availability(&windows, &periods, march()).unwrap();
        let second = compute_effective_availability(&windows, &periods, march()).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ---------------------------------------------------------------------------
// Property 2: A full-day period always empties its dates
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn full_day_dominates(
        windows in prop::collection::vec(arb_weekly(), 0..6),
        periods in prop::collection::vec(arb_period(), 0..6),
    ) {
        let days = compute_effective_availability(&windows, &periods, march()).unwrap();
        for day in &days {
            let blocked = periods.iter().any(|p| p.is_full_day() && p.applies_to(day.date));
            if blocked {
                prop_assert!(day.available_windows.is_empty(), "{} should be empty", day.date);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 3: Output windows are sorted, non-empty and inside a source window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn reduced_windows_are_sorted_and_contained(
        windows in prop::collection::vec(arb_weekly(), 0..6),
        periods in prop::collection::vec(arb_period(), 0..6),
    ) {
        let days = compute_effective_availability(&windows, &periods, march()).unwrap();
        for day in &days {
            for pair in day.available_windows.windows(2) {
                prop_assert!(pair[0].start <= pair[1].start);
            }
            for w in &day.available_windows {
                prop_assert!(w.start < w.end, "zero-length window emitted");
                let weekday = availability_engine::time::day_of_week(day.date);
                prop_assert!(windows.iter().any(|src| src.day_of_week == weekday
                    && src.start_time <= w.start
                    && w.end <= src.end_time));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 4: No surviving window overlaps an applicable partial period
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn surviving_windows_avoid_unavailability(
        windows in prop::collection::vec(arb_weekly(), 0..6),
        periods in prop::collection::vec(arb_period(), 0..6),
    ) {
        let days = compute_effective_availability(&windows, &periods, march()).unwrap();
        for day in &days {
            for period in periods.iter().filter(|p| p.applies_to(day.date)) {
                if let availability_engine::UnavailabilityKind::Partial(blocked) = period.kind {
                    for w in &day.available_windows {
                        prop_assert!(!w.overlaps(&blocked));
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property 5: Slot count = floor((L + b) / (d + b)) for one window
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slot_count_matches_formula(window in arb_range(), params in arb_params()) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        let day = EffectiveDayAvailability { date, available_windows: vec![window] };
        let ctx = SlotContext::new(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(), chrono_tz::UTC);

        let slots = generate_slots(&day, &params, &ctx).unwrap();

        let len = window.duration_minutes();
        let expected = if len >= params.lesson_duration_minutes {
            (len + params.break_minutes) / (params.lesson_duration_minutes + params.break_minutes)
        } else {
            0
        };
        prop_assert_eq!(slots.len() as i64, expected);
        prop_assert_eq!(slot_capacity(len, &params).unwrap(), expected);
    }
}

// ---------------------------------------------------------------------------
// Property 6: Slots are sorted, inside a window, and respect notice
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn slots_are_sorted_contained_and_noticed(
        windows in prop::collection::vec(arb_range(), 0..4),
        params in arb_params(),
        notice in 0i64..=600,
        now_hour in 0u32..24,
    ) {
        let date = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
        let day = EffectiveDayAvailability { date, available_windows: windows.clone() };
        let params = SlotParams { minimum_notice_minutes: notice, ..params };
        let now = Utc.with_ymd_and_hms(2026, 3, 16, now_hour, 0, 0).unwrap();
        let ctx = SlotContext::new(now, chrono_tz::UTC);

        let slots = generate_slots(&day, &params, &ctx).unwrap();

        for pair in slots.windows(2) {
            prop_assert!(pair[0].start_time < pair[1].start_time);
        }
        for slot in &slots {
            prop_assert!(slot.starts_at >= ctx.earliest_start(notice).unwrap());
            prop_assert_eq!(slot.duration_minutes, params.lesson_duration_minutes);
            prop_assert!(windows.iter().any(|w| w.start <= slot.start_time && slot.end_time <= w.end));
        }
    }
}

// ---------------------------------------------------------------------------
// Property 7: Coalesced windows are disjoint and cover the same minutes
// ---------------------------------------------------------------------------
proptest! {
    #![proptest_config(config())]

    #[test]
    fn coalesce_is_disjoint_and_covering(windows in prop::collection::vec(arb_range(), 0..8)) {
        let merged = coalesce_windows(&windows);
        for pair in merged.windows(2) {
            prop_assert!(pair[0].end < pair[1].start, "merged windows must not touch");
        }
        for minute in (0u16..1440).step_by(5) {
            let covered = |rs: &[TimeRange]| rs.iter().any(|r| r.start.minutes() <= minute && minute < r.end.minutes());
            prop_assert_eq!(covered(&windows), covered(&merged));
        }
    }
}
