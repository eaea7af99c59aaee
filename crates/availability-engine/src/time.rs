//! Wall-clock and calendar primitives.
//!
//! All arithmetic is integer minutes since local midnight. A [`TimeRange`] is
//! half-open: `[start, end)`. Two ranges that merely touch do not overlap.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Minutes in a day. `24:00` is a valid end-of-day bound.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time of day with minute precision, in the tutor's local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(MINUTES_PER_DAY);

    /// Build from minutes since midnight. Accepts `0..=1440`.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes > MINUTES_PER_DAY {
            return Err(SlotError::InvalidTime(format!(
                "{} minutes is past the end of the day",
                minutes
            )));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self> {
        if minute >= 60 {
            return Err(SlotError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Self::from_minutes(hour * 60 + minute)
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// Convert to a `NaiveTime`. `24:00` has no `NaiveTime` and yields `None`.
    pub fn to_naive_time(self) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(u32::from(self.hour()), u32::from(self.minute()), 0)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        // Seconds are truncated.
        Self((t.hour() * 60 + t.minute()) as u16)
    }
}

impl FromStr for TimeOfDay {
    type Err = SlotError;

    /// Parse `HH:MM` or `HH:MM:SS`. Seconds are truncated.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SlotError::InvalidTime(s.to_string());

        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let second = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        let parse_field = |field: &str| -> Result<u16> {
            if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            field.parse::<u16>().map_err(|_| invalid())
        };

        let hour = parse_field(hour)?;
        let minute = parse_field(minute)?;
        let second = second.map(parse_field).transpose()?.unwrap_or(0);

        if minute >= 60 || second >= 60 {
            return Err(invalid());
        }
        if hour == 24 && (minute != 0 || second != 0) {
            return Err(invalid());
        }
        if hour > 24 {
            return Err(invalid());
        }

        Ok(Self(hour * 60 + minute))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = SlotError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// A half-open wall-clock range `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeRange {
    /// Returns `InvalidInterval` unless `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start >= end {
            return Err(SlotError::InvalidInterval(format!(
                "start {} is not before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Check the `start < end` invariant on a value built by hand or
    /// deserialized without going through [`TimeRange::new`].
    pub fn validate(&self) -> Result<()> {
        Self::new(self.start, self.end).map(|_| ())
    }

    pub fn duration_minutes(&self) -> i64 {
        i64::from(self.end.minutes()) - i64::from(self.start.minutes())
    }

    /// `true` when the ranges share at least one minute. Touching ranges do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Remove `other` from `self`, returning the surviving pieces in order.
    ///
    /// Yields zero pieces when `other` covers `self`, one when it clips an
    /// edge, two when it sits strictly inside. Zero-length pieces are dropped.
    pub fn subtract(&self, other: &TimeRange) -> Vec<TimeRange> {
        if !self.overlaps(other) {
            return vec![*self];
        }

        let mut pieces = Vec::with_capacity(2);
        if self.start < other.start {
            pieces.push(TimeRange {
                start: self.start,
                end: other.start,
            });
        }
        if other.end < self.end {
            pieces.push(TimeRange {
                start: other.end,
                end: self.end,
            });
        }
        pieces
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// An inclusive calendar date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Returns `InvalidInterval` when `start > end`. A single-day range is valid.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(SlotError::InvalidInterval(format!(
                "date range starts {} after it ends {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Every date in the range, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Range of `days` dates beginning at `start`. `days == 0` is rejected.
    pub fn starting_at(start: NaiveDate, days: u64) -> Result<Self> {
        let last = days
            .checked_sub(1)
            .and_then(|n| start.checked_add_days(Days::new(n)))
            .ok_or_else(|| {
                SlotError::InvalidInterval(format!("cannot build {} day range from {}", days, start))
            })?;
        Self::new(start, last)
    }
}

/// Day of week for `date`, 0 = Sunday through 6 = Saturday.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}
