//! Provider schedules and the schedule resolver.
//!
//! A [`ProviderSchedule`] is a weekly template with one entry per weekday plus
//! date-specific exceptions. Schedules are validated when they are built (from
//! a [`ProviderScheduleBuilder`] or from a stored [`ScheduleRecord`]), so the
//! resolver only ever sees well-formed data:
//!
//! - every weekday has exactly one entry,
//! - an open day has at least one window,
//! - windows within a day are pairwise disjoint and kept sorted by start.
//!
//! [`resolve_windows`] then answers "when is this provider working on this
//! date": an exception for the date wins outright, otherwise the weekday entry
//! applies.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ScheduleConfigError;
use crate::time::{DayOfWeek, Interval};

/// Opening hours for a single day.
///
/// A closed day may still remember the windows it had when it was last open,
/// so that reopening it in the editor restores them. Those windows are never
/// reported by [`DayEntry::windows`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DayEntry {
    open: bool,
    windows: Vec<Interval>,
}

impl DayEntry {
    pub fn closed() -> Self {
        DayEntry::default()
    }

    /// An open day with the given windows, sorted by start.
    ///
    /// # Errors
    /// `OpenDayWithoutWindows` for an empty list, `OverlappingWindows` when any
    /// two windows share time. Windows that merely touch are accepted.
    pub fn open(windows: Vec<Interval>) -> Result<Self, ScheduleConfigError> {
        DayEntry::validated("day entry", windows)
    }

    fn validated(context: &str, mut windows: Vec<Interval>) -> Result<Self, ScheduleConfigError> {
        if windows.is_empty() {
            return Err(ScheduleConfigError::OpenDayWithoutWindows(
                context.to_string(),
            ));
        }

        windows.sort();
        for pair in windows.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(ScheduleConfigError::OverlappingWindows {
                    context: context.to_string(),
                    first: pair[0],
                    second: pair[1],
                });
            }
        }

        Ok(DayEntry {
            open: true,
            windows,
        })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Windows sorted ascending by start time; empty when closed.
    pub fn windows(&self) -> &[Interval] {
        if self.open {
            &self.windows
        } else {
            &[]
        }
    }

    /// Flip open/closed the way the availability editor does. Closing keeps
    /// the windows; reopening restores them, or seeds a single `09:00-17:00`
    /// window when there were none.
    pub fn toggled(&self) -> Self {
        if self.open {
            DayEntry {
                open: false,
                windows: self.windows.clone(),
            }
        } else if self.windows.is_empty() {
            DayEntry {
                open: true,
                windows: vec![default_open_window()],
            }
        } else {
            DayEntry {
                open: true,
                windows: self.windows.clone(),
            }
        }
    }
}

fn default_open_window() -> Interval {
    Interval::whole_hours(9, 17)
}

/// The recurring week: exactly one [`DayEntry`] per weekday.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeeklyTemplate {
    days: [DayEntry; 7],
}

impl WeeklyTemplate {
    /// Build from `(weekday, entry)` pairs covering all seven days once.
    pub fn new(
        entries: impl IntoIterator<Item = (DayOfWeek, DayEntry)>,
    ) -> Result<Self, ScheduleConfigError> {
        let mut slots: [Option<DayEntry>; 7] = Default::default();

        for (day, entry) in entries {
            let slot = &mut slots[usize::from(day.index())];
            if slot.is_some() {
                return Err(ScheduleConfigError::DuplicateWeekday(day));
            }
            *slot = Some(entry);
        }

        let mut days: [DayEntry; 7] = Default::default();
        for (day, slot) in DayOfWeek::ALL.into_iter().zip(slots) {
            days[usize::from(day.index())] =
                slot.ok_or(ScheduleConfigError::MissingWeekday(day))?;
        }

        Ok(WeeklyTemplate { days })
    }

    /// Monday to Friday `09:00-12:00` and `13:00-17:00`; weekends closed.
    pub fn business_hours() -> Self {
        let weekday = DayEntry {
            open: true,
            windows: vec![Interval::whole_hours(9, 12), Interval::whole_hours(13, 17)],
        };
        let days = DayOfWeek::ALL.map(|day| match day {
            DayOfWeek::Saturday | DayOfWeek::Sunday => DayEntry::closed(),
            _ => weekday.clone(),
        });
        WeeklyTemplate { days }
    }

    pub fn entry(&self, day: DayOfWeek) -> &DayEntry {
        &self.days[usize::from(day.index())]
    }

    /// Replace one weekday's entry, returning the edited template.
    pub fn with_entry(&self, day: DayOfWeek, entry: DayEntry) -> Self {
        let mut days = self.days.clone();
        days[usize::from(day.index())] = entry;
        WeeklyTemplate { days }
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DayEntry)> {
        DayOfWeek::ALL.into_iter().zip(self.days.iter())
    }
}

/// One provider's availability: the weekly template plus date overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScheduleRecord", into = "ScheduleRecord")]
pub struct ProviderSchedule {
    template: WeeklyTemplate,
    exceptions: BTreeMap<NaiveDate, DayEntry>,
}

impl ProviderSchedule {
    pub fn new(template: WeeklyTemplate) -> Self {
        ProviderSchedule {
            template,
            exceptions: BTreeMap::new(),
        }
    }

    pub fn builder() -> ProviderScheduleBuilder {
        ProviderScheduleBuilder::default()
    }

    pub fn template(&self) -> &WeeklyTemplate {
        &self.template
    }

    pub fn exception(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.exceptions.get(&date)
    }

    /// A copy with `entry` overriding `date`, replacing any earlier exception
    /// for that date.
    pub fn with_exception(&self, date: NaiveDate, entry: DayEntry) -> Self {
        let mut next = self.clone();
        next.exceptions.insert(date, entry);
        next
    }

    pub fn without_exception(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        next.exceptions.remove(&date);
        next
    }
}

/// Incremental construction of a [`ProviderSchedule`].
///
/// Weekday entries are checked for gaps and duplicates in [`build`]. A second
/// exception for the same date replaces the first.
///
/// [`build`]: ProviderScheduleBuilder::build
#[derive(Debug, Default)]
pub struct ProviderScheduleBuilder {
    weekly: Vec<(DayOfWeek, DayEntry)>,
    exceptions: BTreeMap<NaiveDate, DayEntry>,
}

impl ProviderScheduleBuilder {
    pub fn weekday(mut self, day: DayOfWeek, entry: DayEntry) -> Self {
        self.weekly.push((day, entry));
        self
    }

    pub fn exception(mut self, date: NaiveDate, entry: DayEntry) -> Self {
        self.exceptions.insert(date, entry);
        self
    }

    pub fn build(self) -> Result<ProviderSchedule, ScheduleConfigError> {
        Ok(ProviderSchedule {
            template: WeeklyTemplate::new(self.weekly)?,
            exceptions: self.exceptions,
        })
    }
}

// ---------------------------------------------------------------------------
// Stored records
// ---------------------------------------------------------------------------

/// A weekday entry as stored: `{dayOfWeek, isOpen, windows}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayRecord {
    pub day_of_week: u8,
    pub is_open: bool,
    #[serde(default, alias = "slots")]
    pub windows: Vec<Interval>,
}

/// A date override as stored: `{date, isOpen, windows}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionRecord {
    pub date: NaiveDate,
    pub is_open: bool,
    #[serde(default, alias = "slots")]
    pub windows: Vec<Interval>,
}

/// A provider schedule as stored by the surrounding application.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    #[serde(alias = "weeklyAvailability")]
    pub weekly: Vec<DayRecord>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionRecord>,
}

impl ScheduleRecord {
    /// Validate the stored record and resolve it for `date`.
    ///
    /// # Errors
    /// Any [`ScheduleConfigError`] the record carries, such as a missing
    /// weekday. A malformed record never resolves to a default.
    pub fn resolve_windows(&self, date: NaiveDate) -> Result<Vec<Interval>, ScheduleConfigError> {
        let schedule = ProviderSchedule::try_from(self.clone())?;
        Ok(resolve_windows(&schedule, date))
    }
}

/// Closed records may still carry the windows the editor showed before the
/// day was switched off. They are kept for reopening when they would form a
/// valid open day, and dropped otherwise.
fn entry_from_record(
    context: &str,
    is_open: bool,
    windows: Vec<Interval>,
) -> Result<DayEntry, ScheduleConfigError> {
    if is_open {
        return DayEntry::validated(context, windows);
    }
    Ok(DayEntry::validated(context, windows)
        .map(|entry| entry.toggled())
        .unwrap_or_default())
}

impl TryFrom<ScheduleRecord> for ProviderSchedule {
    type Error = ScheduleConfigError;

    fn try_from(record: ScheduleRecord) -> Result<Self, Self::Error> {
        let mut builder = ProviderSchedule::builder();

        for day in record.weekly {
            let weekday = DayOfWeek::from_index(day.day_of_week)?;
            let entry = entry_from_record(&weekday.to_string(), day.is_open, day.windows)?;
            builder = builder.weekday(weekday, entry);
        }

        // Records are in definition order, so a later exception for the same
        // date replaces an earlier one.
        for exception in record.exceptions {
            let entry = entry_from_record(
                &exception.date.to_string(),
                exception.is_open,
                exception.windows,
            )?;
            builder = builder.exception(exception.date, entry);
        }

        builder.build()
    }
}

impl From<ProviderSchedule> for ScheduleRecord {
    fn from(schedule: ProviderSchedule) -> Self {
        let weekly = schedule
            .template
            .iter()
            .map(|(day, entry)| DayRecord {
                day_of_week: day.index(),
                is_open: entry.is_open(),
                windows: entry.windows.clone(),
            })
            .collect();

        let exceptions = schedule
            .exceptions
            .into_iter()
            .map(|(date, entry)| ExceptionRecord {
                date,
                is_open: entry.is_open(),
                windows: entry.windows,
            })
            .collect();

        ScheduleRecord { weekly, exceptions }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Working windows for `date`, sorted by start time.
///
/// An exception for `date` replaces the weekly entry completely, whether it
/// opens or closes the day. An empty result means the provider is closed.
pub fn resolve_windows(schedule: &ProviderSchedule, date: NaiveDate) -> Vec<Interval> {
    if let Some(exception) = schedule.exception(date) {
        debug!(%date, open = exception.is_open(), "date exception applies");
        return exception.windows().to_vec();
    }

    let day = DayOfWeek::of(date);
    let entry = schedule.template().entry(day);
    if !entry.is_open() {
        debug!(%date, weekday = %day, "closed by weekly template");
    }
    entry.windows().to_vec()
}
