//! WASM bindings for availability-engine.
//!
//! Exposes effective-availability reduction and bookable slot generation to
//! the JavaScript booking client via `wasm-bindgen`. All complex types are
//! passed as JSON strings using the engine's snake_case record shapes.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p availability-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target bundler --out-dir packages/availability-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/availability_engine_wasm.wasm
//! ```

use availability_engine::{
    BookableSlot, BookedInterval, DateRange, DstPolicy, EffectiveDayAvailability, SlotContext, SlotParams,
    UnavailabilityPeriod, WeeklyAvailabilityWindow,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Helpers: JSON and datetime parsing, kept free of JsValue so they run natively
// ---------------------------------------------------------------------------

type BindingResult<T> = Result<T, String>;

fn parse_json<T: DeserializeOwned>(what: &str, json: &str) -> BindingResult<T> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> BindingResult<String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization error: {}", e))
}

fn parse_date(s: &str) -> BindingResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("Invalid date '{}': {}", s, e))
}

/// Parse an ISO 8601 datetime string into `DateTime<Utc>`.
///
/// Accepts RFC 3339 (with offset) and naive `YYYY-MM-DDTHH:MM:SS`, which is
/// interpreted as UTC.
fn parse_datetime(s: &str) -> BindingResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .map_err(|e| format!("Invalid datetime '{}': {}", s, e))
}

fn parse_dst_policy(policy: Option<&str>) -> BindingResult<DstPolicy> {
    match policy {
        None | Some("shift_forward") => Ok(DstPolicy::ShiftForward),
        Some("skip") => Ok(DstPolicy::Skip),
        Some(other) => Err(format!(
            "Invalid DST policy '{}': expected \"skip\" or \"shift_forward\"",
            other
        )),
    }
}

fn slot_context(now: &str, timezone: &str, dst_policy: Option<&str>) -> BindingResult<SlotContext> {
    let tz = availability_engine::parse_timezone(timezone).map_err(|e| e.to_string())?;
    Ok(SlotContext::new(parse_datetime(now)?, tz).with_dst_policy(parse_dst_policy(dst_policy)?))
}

fn date_range(start_date: &str, end_date: &str) -> BindingResult<DateRange> {
    DateRange::new(parse_date(start_date)?, parse_date(end_date)?).map_err(|e| e.to_string())
}

fn effective_json(
    weekly_json: &str,
    unavailability_json: &str,
    start_date: &str,
    end_date: &str,
) -> BindingResult<String> {
    let weekly: Vec<WeeklyAvailabilityWindow> = parse_json("weekly availability", weekly_json)?;
    let periods: Vec<UnavailabilityPeriod> = parse_json("unavailability", unavailability_json)?;
    let days = availability_engine::compute_effective_availability(
        &weekly,
        &periods,
        date_range(start_date, end_date)?,
    )
    .map_err(|e| e.to_string())?;
    to_json(&days)
}

fn day_slots_json(
    day_json: &str,
    params: SlotParams,
    now: &str,
    timezone: &str,
    dst_policy: Option<&str>,
) -> BindingResult<String> {
    let day: EffectiveDayAvailability = parse_json("effective day", day_json)?;
    let ctx = slot_context(now, timezone, dst_policy)?;
    let slots: Vec<BookableSlot> =
        availability_engine::generate_slots(&day, &params, &ctx).map_err(|e| e.to_string())?;
    to_json(&slots)
}

#[allow(clippy::too_many_arguments)]
fn range_slots_json(
    weekly_json: &str,
    unavailability_json: &str,
    booked_json: &str,
    start_date: &str,
    end_date: &str,
    params: SlotParams,
    now: &str,
    timezone: &str,
    dst_policy: Option<&str>,
) -> BindingResult<String> {
    let weekly: Vec<WeeklyAvailabilityWindow> = parse_json("weekly availability", weekly_json)?;
    let periods: Vec<UnavailabilityPeriod> = parse_json("unavailability", unavailability_json)?;
    let booked: Vec<BookedInterval> = parse_json("booked lessons", booked_json)?;
    let ctx = slot_context(now, timezone, dst_policy)?;
    let days = availability_engine::bookable_slots(
        &weekly,
        &periods,
        &booked,
        date_range(start_date, end_date)?,
        &params,
        &ctx,
    )
    .map_err(|e| e.to_string())?;
    to_json(&days)
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Compute effective availability for each date in `[startDate, endDate]`.
///
/// `weeklyJson` is an array of `{day_of_week, start_time, end_time}`;
/// `unavailabilityJson` an array of `{start_date, end_date, is_full_day,
/// start_time?, end_time?}`. Returns a JSON array of
/// `{date, available_windows: [{start, end}]}`.
#[wasm_bindgen(js_name = "computeEffectiveAvailability")]
pub fn compute_effective_availability(
    weekly_json: &str,
    unavailability_json: &str,
    start_date: &str,
    end_date: &str,
) -> Result<String, JsValue> {
    effective_json(weekly_json, unavailability_json, start_date, end_date)
        .map_err(|e| JsValue::from_str(&e))
}

/// Generate bookable slots for one effective day.
///
/// `dayJson` is one element of [`compute_effective_availability`]'s output.
/// `now` is an ISO 8601 instant, `timezone` the tutor's IANA zone, and
/// `dstPolicy` either `"skip"` or `"shift_forward"` (the default).
#[wasm_bindgen(js_name = "generateSlots")]
pub fn generate_slots(
    day_json: &str,
    lesson_duration_minutes: i32,
    break_minutes: i32,
    minimum_notice_minutes: i32,
    now: &str,
    timezone: &str,
    dst_policy: Option<String>,
) -> Result<String, JsValue> {
    let params = SlotParams::new(
        i64::from(lesson_duration_minutes),
        i64::from(break_minutes),
        i64::from(minimum_notice_minutes),
    );
    day_slots_json(day_json, params, now, timezone, dst_policy.as_deref())
        .map_err(|e| JsValue::from_str(&e))
}

/// Reduce and discretize a whole date range in one call.
///
/// `bookedJson` is an array of `{starts_at, ends_at}` lessons already booked;
/// overlapping slots are left out. Returns a JSON array of `{date, slots}`
/// with one entry per date.
#[allow(clippy::too_many_arguments)]
#[wasm_bindgen(js_name = "bookableSlots")]
pub fn bookable_slots(
    weekly_json: &str,
    unavailability_json: &str,
    booked_json: &str,
    start_date: &str,
    end_date: &str,
    lesson_duration_minutes: i32,
    break_minutes: i32,
    minimum_notice_minutes: i32,
    now: &str,
    timezone: &str,
    dst_policy: Option<String>,
) -> Result<String, JsValue> {
    let params = SlotParams::new(
        i64::from(lesson_duration_minutes),
        i64::from(break_minutes),
        i64::from(minimum_notice_minutes),
    );
    range_slots_json(
        weekly_json,
        unavailability_json,
        booked_json,
        start_date,
        end_date,
        params,
        now,
        timezone,
        dst_policy.as_deref(),
    )
    .map_err(|e| JsValue::from_str(&e))
}
