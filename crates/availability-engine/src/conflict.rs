//! Drop bookable slots that collide with lessons already booked.
//!
//! Adjacent intervals (one ends exactly when another starts) are NOT conflicts.
//! This is a pre-filter for display; the booking transaction still re-checks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::BookableSlot;

/// An existing booking, as absolute instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookedInterval {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Minutes of overlap between `slot` and `booked`, or `None` if they do not overlap.
///
/// Two intervals overlap when `a.start < b.end && b.start < a.end`.
pub fn overlap_minutes(slot: &BookableSlot, booked: &BookedInterval) -> Option<i64> {
    if slot.starts_at < booked.ends_at && booked.starts_at < slot.ends_at {
        let overlap_start = slot.starts_at.max(booked.starts_at);
        let overlap_end = slot.ends_at.min(booked.ends_at);
        Some((overlap_end - overlap_start).num_minutes())
    } else {
        None
    }
}

pub fn conflicts_with_any(slot: &BookableSlot, booked: &[BookedInterval]) -> bool {
    booked.iter().any(|b| overlap_minutes(slot, b).is_some())
}

/// Keep only the slots that overlap none of `booked`, preserving order.
pub fn exclude_booked(slots: Vec<BookableSlot>, booked: &[BookedInterval]) -> Vec<BookableSlot> {
    if booked.is_empty() {
        return slots;
    }
    slots
        .into_iter()
        .filter(|slot| !conflicts_with_any(slot, booked))
        .collect()
}
