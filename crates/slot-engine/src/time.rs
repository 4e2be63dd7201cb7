//! Minute-granularity time arithmetic.
//!
//! Wall-clock times are stored as minutes since midnight so that comparison
//! and arithmetic are plain integer operations. The `"HH:MM"` text form exists
//! only at the serialization boundary, and parsing is strict: both fields must
//! be two digits, so `"09:5"` is rejected instead of being compared as a string.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ScheduleConfigError};

/// Minutes in one day. Valid [`TimeOfDay`] values are `0..MINUTES_PER_DAY`.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time with minute granularity (`00:00` through `23:59`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    /// Build from minutes since midnight.
    pub fn new(minutes: u16) -> Result<Self, EngineError> {
        if minutes < MINUTES_PER_DAY {
            Ok(TimeOfDay(minutes))
        } else {
            Err(EngineError::InvalidTime(format!(
                "{} minutes is past the end of the day",
                minutes
            )))
        }
    }

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, EngineError> {
        if hour >= 24 || minute >= 60 {
            return Err(EngineError::InvalidTime(format!(
                "{}:{} is not a valid time of day",
                hour, minute
            )));
        }
        Ok(TimeOfDay(hour * 60 + minute))
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

    /// Advance by `minutes`, or `None` if the result would leave the day.
    pub fn checked_add_minutes(self, minutes: u32) -> Option<TimeOfDay> {
        let total = u32::from(self.0).checked_add(minutes)?;
        u16::try_from(total)
            .ok()
            .filter(|m| *m < MINUTES_PER_DAY)
            .map(TimeOfDay)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::InvalidTime(format!("expected HH:MM, got '{}'", s));

        let (h, m) = s.split_once(':').ok_or_else(invalid)?;
        let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
        if !two_digits(h) || !two_digits(m) {
            return Err(invalid());
        }

        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        TimeOfDay::from_hm(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// Wire shape of an [`Interval`]: two `"HH:MM"` strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

/// A half-open span `[start, end)` within one day. Always `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalRecord", into = "IntervalRecord")]
pub struct Interval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl Interval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, ScheduleConfigError> {
        if start < end {
            Ok(Interval { start, end })
        } else {
            Err(ScheduleConfigError::InvalidInterval {
                start: start.to_string(),
                end: end.to_string(),
            })
        }
    }

    /// Parse from two `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, EngineError> {
        Ok(Interval::new(start.parse()?, end.parse()?)?)
    }

    /// The interval of length `minutes` starting at `start`, if it ends
    /// within the day.
    pub fn starting_at(start: TimeOfDay, minutes: u32) -> Option<Self> {
        if minutes == 0 {
            return None;
        }
        let end = start.checked_add_minutes(minutes)?;
        Some(Interval { start, end })
    }

    /// `[start:00, end:00)` for hour constants known to be in order.
    pub(crate) const fn whole_hours(start_hour: u16, end_hour: u16) -> Self {
        debug_assert!(start_hour < end_hour && end_hour < 24);
        Interval {
            start: TimeOfDay(start_hour * 60),
            end: TimeOfDay(end_hour * 60),
        }
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.end.minutes() - self.start.minutes())
    }

    /// Half-open overlap: `a.start < b.end && b.start < a.end`.
    /// Intervals that only touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Minutes shared by both intervals (0 when they do not overlap).
    pub fn overlap_minutes(&self, other: &Interval) -> u32 {
        if !self.overlaps(other) {
            return 0;
        }
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        u32::from(end.minutes() - start.minutes())
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl TryFrom<IntervalRecord> for Interval {
    type Error = ScheduleConfigError;

    fn try_from(record: IntervalRecord) -> Result<Self, Self::Error> {
        Interval::new(record.start, record.end)
    }
}

impl From<Interval> for IntervalRecord {
    fn from(i: Interval) -> Self {
        IntervalRecord {
            start: i.start,
            end: i.end,
        }
    }
}

/// Day of the week, numbered 0 = Sunday through 6 = Saturday on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn from_index(index: u8) -> Result<Self, ScheduleConfigError> {
        DayOfWeek::ALL
            .get(usize::from(index))
            .copied()
            .ok_or(ScheduleConfigError::InvalidWeekday(index))
    }

    /// 0 = Sunday .. 6 = Saturday.
    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(w: Weekday) -> Self {
        DayOfWeek::ALL[w.num_days_from_sunday() as usize]
    }
}

impl TryFrom<u8> for DayOfWeek {
    type Error = ScheduleConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DayOfWeek::from_index(value)
    }
}

impl From<DayOfWeek> for u8 {
    fn from(d: DayOfWeek) -> Self {
        d.index()
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        };
        f.write_str(name)
    }
}
