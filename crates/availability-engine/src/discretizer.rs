//! Cut effective availability windows into fixed-length bookable slots.
//!
//! Within each window a cursor starts at the window start and advances by
//! `lesson + break` until the next lesson would run past the window end. The
//! cursor resets per window. Slots starting before `now + notice` are
//! dropped without shifting the slots that follow.

use std::collections::HashSet;

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::dst::{resolve_local, DstPolicy};
use crate::error::{Result, SlotError};
use crate::model::{BookableSlot, EffectiveDayAvailability};
use crate::time::{TimeOfDay, TimeRange, MINUTES_PER_DAY};

/// Lesson shape and notice rules for one slot request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotParams {
    pub lesson_duration_minutes: i64,
    /// Gap required between consecutive slots. 0 means back to back.
    #[serde(default)]
    pub break_minutes: i64,
    /// Slots may not start before `now + minimum_notice_minutes`.
    #[serde(default)]
    pub minimum_notice_minutes: i64,
}

impl SlotParams {
    pub fn new(lesson_duration_minutes: i64, break_minutes: i64, minimum_notice_minutes: i64) -> Self {
        Self {
            lesson_duration_minutes,
            break_minutes,
            minimum_notice_minutes,
        }
    }

    /// # Errors
    /// `SlotError::InvalidParameter` if the duration is not positive, the
    /// break or notice is negative, or the duration or break exceeds a day.
    pub fn validate(&self) -> Result<()> {
        let day = i64::from(MINUTES_PER_DAY);
        if self.lesson_duration_minutes <= 0 {
            return Err(SlotError::InvalidParameter(format!(
                "lesson duration must be positive, got {}",
                self.lesson_duration_minutes
            )));
        }
        if self.lesson_duration_minutes > day {
            return Err(SlotError::InvalidParameter(format!(
                "lesson duration must fit in a day, got {}",
                self.lesson_duration_minutes
            )));
        }
        if self.break_minutes < 0 {
            return Err(SlotError::InvalidParameter(format!(
                "break must not be negative, got {}",
                self.break_minutes
            )));
        }
        if self.break_minutes > day {
            return Err(SlotError::InvalidParameter(format!(
                "break must fit in a day, got {}",
                self.break_minutes
            )));
        }
        if self.minimum_notice_minutes < 0 {
            return Err(SlotError::InvalidParameter(format!(
                "minimum notice must not be negative, got {}",
                self.minimum_notice_minutes
            )));
        }
        Ok(())
    }

    fn step_minutes(&self) -> i64 {
        self.lesson_duration_minutes + self.break_minutes
    }
}

/// Clock and timezone a slot request is evaluated against.
///
/// `now` is supplied by the caller; the engine never reads the system clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotContext {
    pub now: DateTime<Utc>,
    /// The tutor's timezone, in which availability times are wall-clock times.
    pub timezone: Tz,
    pub dst_policy: DstPolicy,
}

impl SlotContext {
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self {
            now,
            timezone,
            dst_policy: DstPolicy::default(),
        }
    }

    pub fn with_dst_policy(mut self, dst_policy: DstPolicy) -> Self {
        self.dst_policy = dst_policy;
        self
    }

    /// Earliest instant a slot may start for the given notice.
    ///
    /// # Errors
    /// `SlotError::InvalidParameter` if `now + notice` is not representable.
    pub fn earliest_start(&self, minimum_notice_minutes: i64) -> Result<DateTime<Utc>> {
        TimeDelta::try_minutes(minimum_notice_minutes)
            .and_then(|notice| self.now.checked_add_signed(notice))
            .ok_or_else(|| {
                SlotError::InvalidParameter(format!(
                    "minimum notice of {} minutes is out of range",
                    minimum_notice_minutes
                ))
            })
    }
}

/// Parse an IANA timezone identifier such as `"Europe/Istanbul"`.
///
/// # Errors
/// `SlotError::InvalidTimezone` if the identifier is unknown.
pub fn parse_timezone(timezone: &str) -> Result<Tz> {
    timezone
        .parse()
        .map_err(|_| SlotError::InvalidTimezone(timezone.to_string()))
}

/// Generate the bookable slots for one day of effective availability.
///
/// Windows need not be sorted; the output is sorted by start time. A lesson
/// is offered once per absolute start instant, so duplicates from overlapping
/// source windows or from a DST shift landing on a later slot appear once;
/// the per-window count formula holds only after that removal. An empty day
/// yields an empty list.
///
/// # Errors
/// `SlotError::InvalidParameter` for invalid `params`;
/// `SlotError::InvalidInterval` if any window has `start >= end`.
pub fn generate_slots(
    day: &EffectiveDayAvailability,
    params: &SlotParams,
    ctx: &SlotContext,
) -> Result<Vec<BookableSlot>> {
    params.validate()?;
    for window in &day.available_windows {
        window.validate()?;
    }

    let earliest = ctx.earliest_start(params.minimum_notice_minutes)?;
    let midnight = day.date.and_time(NaiveTime::MIN);

    let mut slots: Vec<BookableSlot> = day
        .available_windows
        .iter()
        .flat_map(|window| slot_starts(window, params))
        .filter_map(|start| {
            let end = start + params.lesson_duration_minutes;
            let starts_at = resolve_local(local_at(midnight, start), ctx.timezone, ctx.dst_policy)?;
            if starts_at < earliest {
                return None;
            }
            Some(BookableSlot {
                date: day.date,
                start_time: minute_of_day(start)?,
                end_time: minute_of_day(end)?,
                duration_minutes: params.lesson_duration_minutes,
                starts_at,
                ends_at: starts_at + Duration::minutes(params.lesson_duration_minutes),
            })
        })
        .collect();

    // A wall-clock slot wins over a DST-shifted slot at the same instant.
    slots.sort_by_key(|s| (s.starts_at, is_shifted(s, ctx.timezone), s.start_time));
    let mut seen = HashSet::new();
    slots.retain(|s| seen.insert(s.starts_at));

    slots.sort_by_key(|s| (s.start_time, s.end_time));
    Ok(slots)
}

/// `true` when the slot's instant does not read back as its local start time.
fn is_shifted(slot: &BookableSlot, tz: Tz) -> bool {
    let local = slot.starts_at.with_timezone(&tz).naive_local();
    local.date() != slot.date || TimeOfDay::from(local.time()) != slot.start_time
}

/// Candidate start minutes within one window, before notice filtering.
fn slot_starts(window: &TimeRange, params: &SlotParams) -> impl Iterator<Item = i64> {
    let window_end = i64::from(window.end.minutes());
    let duration = params.lesson_duration_minutes;
    let step = params.step_minutes();
    std::iter::successors(Some(i64::from(window.start.minutes())), move |cursor| {
        Some(cursor + step)
    })
    .take_while(move |cursor| cursor + duration <= window_end)
}

fn local_at(midnight: NaiveDateTime, minutes: i64) -> NaiveDateTime {
    midnight + Duration::minutes(minutes)
}

fn minute_of_day(minutes: i64) -> Option<TimeOfDay> {
    u16::try_from(minutes)
        .ok()
        .and_then(|m| TimeOfDay::from_minutes(m).ok())
}

/// Number of slots a single window of `window_minutes` yields before notice
/// filtering: `floor((L + b) / (d + b))`, or 0 when the lesson does not fit.
///
/// # Errors
/// `SlotError::InvalidParameter` for invalid `params`.
pub fn slot_capacity(window_minutes: i64, params: &SlotParams) -> Result<i64> {
    params.validate()?;
    if window_minutes < params.lesson_duration_minutes {
        return Ok(0);
    }
    Ok((window_minutes + params.break_minutes) / params.step_minutes())
}
