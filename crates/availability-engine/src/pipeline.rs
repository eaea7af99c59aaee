//! Reducer and discretizer composed over a date range.

use crate::conflict::{exclude_booked, BookedInterval};
use crate::discretizer::{generate_slots, SlotContext, SlotParams};
use crate::error::Result;
use crate::model::{
    BookableSlot, DaySlots, EffectiveDayAvailability, UnavailabilityPeriod,
    WeeklyAvailabilityWindow,
};
use crate::reducer::compute_effective_availability;
use crate::time::DateRange;

/// Bookable slots for every date in `range`, one entry per date in order.
///
/// Dates with no availability carry an empty slot list. Slots overlapping any
/// of `booked` are left out.
pub fn bookable_slots(
    weekly_windows: &[WeeklyAvailabilityWindow],
    unavailability: &[UnavailabilityPeriod],
    booked: &[BookedInterval],
    range: DateRange,
    params: &SlotParams,
    ctx: &SlotContext,
) -> Result<Vec<DaySlots>> {
    params.validate()?;
    let days = compute_effective_availability(weekly_windows, unavailability, range)?;
    slots_for_days(&days, booked, params, ctx)
}

/// The earliest bookable slot in `range` that overlaps none of `booked`.
pub fn first_bookable_slot(
    weekly_windows: &[WeeklyAvailabilityWindow],
    unavailability: &[UnavailabilityPeriod],
    booked: &[BookedInterval],
    range: DateRange,
    params: &SlotParams,
    ctx: &SlotContext,
) -> Result<Option<BookableSlot>> {
    params.validate()?;
    let days = compute_effective_availability(weekly_windows, unavailability, range)?;
    first_slot_in_days(&days, booked, params, ctx)
}

/// Discretize already-reduced days, e.g. after [`coalesce_days`](crate::reducer::coalesce_days).
pub fn slots_for_days(
    days: &[EffectiveDayAvailability],
    booked: &[BookedInterval],
    params: &SlotParams,
    ctx: &SlotContext,
) -> Result<Vec<DaySlots>> {
    days.iter()
        .map(|day| {
            Ok(DaySlots {
                date: day.date,
                slots: exclude_booked(generate_slots(day, params, ctx)?, booked),
            })
        })
        .collect()
}

/// First free slot across already-reduced days, stopping at the first date that has one.
pub fn first_slot_in_days(
    days: &[EffectiveDayAvailability],
    booked: &[BookedInterval],
    params: &SlotParams,
    ctx: &SlotContext,
) -> Result<Option<BookableSlot>> {
    params.validate()?;
    for day in days {
        let slots = exclude_booked(generate_slots(day, params, ctx)?, booked);
        if let Some(slot) = slots.into_iter().next() {
            return Ok(Some(slot));
        }
    }
    Ok(None)
}
