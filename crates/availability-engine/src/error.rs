//! Error types for availability-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    /// A time window or date range whose start is not strictly before its end,
    /// or a weekly window with a day of week outside `0..=6`.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// Discretization parameters out of range (non-positive duration,
    /// negative break or notice).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A wall-clock time string that is not `HH:MM` or `HH:MM:SS`.
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, SlotError>;
