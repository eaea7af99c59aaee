//! # availability-engine
//!
//! Deterministic tutor availability resolution for lesson booking.
//!
//! Turns a tutor's recurring weekly availability and date-bound
//! unavailability into effective per-day windows, then cuts those windows
//! into bookable lesson slots with breaks and minimum-notice filtering. The
//! engine is pure: the current instant and the tutor's IANA timezone are
//! passed in, never read from the environment.
//!
//! ## Modules
//!
//! - [`time`] — wall-clock times, half-open time ranges, inclusive date ranges
//! - [`model`] — availability records, effective days, bookable slots
//! - [`reducer`] — weekly windows minus unavailability → effective windows
//! - [`discretizer`] — effective windows → bookable slots
//! - [`dst`] — DST gap policies for resolving local slot starts
//! - [`conflict`] — drop slots that collide with existing bookings
//! - [`pipeline`] — reducer and discretizer over a date range
//! - [`error`] — Error types

pub mod conflict;
pub mod discretizer;
pub mod dst;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reducer;
pub mod time;

pub use conflict::{exclude_booked, BookedInterval};
pub use discretizer::{generate_slots, parse_timezone, SlotContext, SlotParams};
pub use dst::DstPolicy;
pub use error::SlotError;
pub use model::{
    BookableSlot, DaySlots, EffectiveDayAvailability, UnavailabilityKind, UnavailabilityPeriod,
    WeeklyAvailabilityWindow,
};
pub use pipeline::{bookable_slots, first_bookable_slot};
pub use reducer::{coalesce_windows, compute_effective_availability};
pub use time::{DateRange, TimeOfDay, TimeRange};
