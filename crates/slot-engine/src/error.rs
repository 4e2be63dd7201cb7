//! Error types for slot-engine operations.

use thiserror::Error;

use crate::time::{DayOfWeek, Interval};

/// A provider schedule that cannot be accepted.
///
/// Raised when a schedule is constructed, so a malformed schedule never
/// reaches the resolver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleConfigError {
    #[error("weekly template has no entry for {0}")]
    MissingWeekday(DayOfWeek),

    #[error("weekly template has more than one entry for {0}")]
    DuplicateWeekday(DayOfWeek),

    #[error("day-of-week must be 0..=6 (0 = Sunday), got {0}")]
    InvalidWeekday(u8),

    #[error("{context}: windows {first} and {second} overlap")]
    OverlappingWindows {
        context: String,
        first: Interval,
        second: Interval,
    },

    #[error("{0}: marked open but has no windows")]
    OpenDayWithoutWindows(String),

    #[error("invalid interval {start}-{end}: start must be before end")]
    InvalidInterval { start: String, end: String },
}

/// Errors surfaced by the engine and its request flow.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Schedule configuration error: {0}")]
    ScheduleConfig(#[from] ScheduleConfigError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Slot {start} on {date} is no longer available")]
    SlotUnavailable { date: String, start: String },

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
