//! The JSON request document the CLI reads, and how flags override it.

use anyhow::{Context, Result};
use availability_engine::{
    BookedInterval, DateRange, SlotParams, UnavailabilityPeriod, WeeklyAvailabilityWindow,
};
use chrono::NaiveDate;
use serde::Deserialize;

/// A tutor's availability records plus the range and lesson settings to evaluate.
///
/// Record fields use the same snake_case row shape as the availability tables.
#[derive(Debug, Deserialize)]
pub struct AvailabilityRequest {
    #[serde(default)]
    pub weekly: Vec<WeeklyAvailabilityWindow>,
    #[serde(default)]
    pub unavailability: Vec<UnavailabilityPeriod>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Tutor's IANA timezone.
    pub timezone: Option<String>,
    pub lesson_duration_minutes: Option<i64>,
    pub break_minutes: Option<i64>,
    pub minimum_notice_minutes: Option<i64>,
    #[serde(default)]
    pub booked: Vec<BookedInterval>,
}

impl AvailabilityRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse availability request JSON")
    }

    pub fn date_range(&self) -> Result<DateRange> {
        DateRange::new(self.start_date, self.end_date).context("Invalid date range in request")
    }

    /// Slot parameters with command-line values taking precedence over the document.
    pub fn slot_params(&self, overrides: &ParamOverrides) -> Result<SlotParams> {
        let lesson_duration_minutes = overrides
            .duration
            .or(self.lesson_duration_minutes)
            .context("No lesson duration: pass --duration or set lesson_duration_minutes")?;
        Ok(SlotParams {
            lesson_duration_minutes,
            break_minutes: overrides.break_minutes.or(self.break_minutes).unwrap_or(0),
            minimum_notice_minutes: overrides
                .notice
                .or(self.minimum_notice_minutes)
                .unwrap_or(0),
        })
    }

    /// Command-line timezone first, then the document's, then UTC.
    pub fn timezone<'a>(&'a self, flag: Option<&'a str>) -> &'a str {
        flag.or(self.timezone.as_deref()).unwrap_or("UTC")
    }
}

/// Slot parameters given on the command line.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParamOverrides {
    pub duration: Option<i64>,
    pub break_minutes: Option<i64>,
    pub notice: Option<i64>,
}
