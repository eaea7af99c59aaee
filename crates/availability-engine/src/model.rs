//! Availability records and the values derived from them.
//!
//! Input records keep the flat row shape the availability storage returns,
//! so they deserialize directly from database JSON. Unavailability is lifted
//! into a tagged [`UnavailabilityKind`] on the way in.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::time::{DateRange, TimeOfDay, TimeRange};

/// A recurring weekly window during which a tutor is normally bookable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyAvailabilityWindow {
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
}

impl WeeklyAvailabilityWindow {
    pub fn new(day_of_week: u8, start_time: TimeOfDay, end_time: TimeOfDay) -> Result<Self> {
        let window = Self {
            day_of_week,
            start_time,
            end_time,
        };
        window.validate()?;
        Ok(window)
    }

    pub fn validate(&self) -> Result<()> {
        if self.day_of_week > 6 {
            return Err(SlotError::InvalidInterval(format!(
                "day_of_week {} is outside 0..=6",
                self.day_of_week
            )));
        }
        self.range().map(|_| ())
    }

    pub fn range(&self) -> Result<TimeRange> {
        TimeRange::new(self.start_time, self.end_time)
    }
}

/// Whether an unavailability period blocks the whole day or a time span of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailabilityKind {
    FullDay,
    /// Removes this span from every date in the period.
    Partial(TimeRange),
}

/// A date-bound override removing time from the weekly availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UnavailabilityRecord", into = "UnavailabilityRecord")]
pub struct UnavailabilityPeriod {
    pub dates: DateRange,
    pub kind: UnavailabilityKind,
}

impl UnavailabilityPeriod {
    pub fn full_day(start_date: NaiveDate, end_date: NaiveDate) -> Result<Self> {
        Ok(Self {
            dates: DateRange::new(start_date, end_date)?,
            kind: UnavailabilityKind::FullDay,
        })
    }

    pub fn partial(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Result<Self> {
        Ok(Self {
            dates: DateRange::new(start_date, end_date)?,
            kind: UnavailabilityKind::Partial(TimeRange::new(start_time, end_time)?),
        })
    }

    pub fn validate(&self) -> Result<()> {
        DateRange::new(self.dates.start, self.dates.end)?;
        match &self.kind {
            UnavailabilityKind::FullDay => Ok(()),
            UnavailabilityKind::Partial(range) => range.validate(),
        }
    }

    pub fn applies_to(&self, date: NaiveDate) -> bool {
        self.dates.contains(date)
    }

    pub fn is_full_day(&self) -> bool {
        matches!(self.kind, UnavailabilityKind::FullDay)
    }
}

/// Flat row form of [`UnavailabilityPeriod`]: times are present only when
/// `is_full_day` is false.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnavailabilityRecord {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_full_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<TimeOfDay>,
}

impl TryFrom<UnavailabilityRecord> for UnavailabilityPeriod {
    type Error = SlotError;

    fn try_from(record: UnavailabilityRecord) -> Result<Self> {
        if record.is_full_day {
            return Self::full_day(record.start_date, record.end_date);
        }
        match (record.start_time, record.end_time) {
            (Some(start), Some(end)) => Self::partial(record.start_date, record.end_date, start, end),
            _ => Err(SlotError::InvalidInterval(format!(
                "partial unavailability {}..{} is missing a start or end time",
                record.start_date, record.end_date
            ))),
        }
    }
}

impl From<UnavailabilityPeriod> for UnavailabilityRecord {
    fn from(period: UnavailabilityPeriod) -> Self {
        let (is_full_day, start_time, end_time) = match period.kind {
            UnavailabilityKind::FullDay => (true, None, None),
            UnavailabilityKind::Partial(range) => (false, Some(range.start), Some(range.end)),
        };
        Self {
            start_date: period.dates.start,
            end_date: period.dates.end,
            is_full_day,
            start_time,
            end_time,
        }
    }
}

/// Net bookable time for one calendar date after all overrides are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveDayAvailability {
    pub date: NaiveDate,
    /// Sorted ascending by start.
    pub available_windows: Vec<TimeRange>,
}

impl EffectiveDayAvailability {
    pub fn is_empty(&self) -> bool {
        self.available_windows.is_empty()
    }

    pub fn total_minutes(&self) -> i64 {
        self.available_windows
            .iter()
            .map(TimeRange::duration_minutes)
            .sum()
    }
}

/// A concrete, duration-matched lesson start a student can select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookableSlot {
    pub date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub duration_minutes: i64,
    /// Absolute start, resolved in the tutor's timezone.
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl BookableSlot {
    /// Start and end rendered in another timezone, typically the student's.
    pub fn in_timezone(&self, tz: Tz) -> (DateTime<Tz>, DateTime<Tz>) {
        (self.starts_at.with_timezone(&tz), self.ends_at.with_timezone(&tz))
    }
}

/// Bookable slots for one date of a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<BookableSlot>,
}
