//! A self-contained, read-only input bundle for one provider.
//!
//! Used by the CLI and the WASM bindings, which receive everything as JSON
//! instead of going through a [`Repository`](crate::ledger::Repository).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, Service};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::schedule::ScheduleRecord;
use crate::slots::available_slots;
use crate::time::{Interval, TimeOfDay};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schedule: ScheduleRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn windows(&self, date: NaiveDate) -> Result<Vec<Interval>> {
        Ok(self.schedule.resolve_windows(date)?)
    }

    /// Bookable start times on `date`. Bookings dated elsewhere are ignored.
    ///
    /// # Errors
    /// `NotFound` when the snapshot carries no service, plus anything
    /// [`windows`](Snapshot::windows) or [`available_slots`] reports.
    pub fn slots(&self, date: NaiveDate, config: &EngineConfig) -> Result<Vec<TimeOfDay>> {
        let service = self
            .service
            .as_ref()
            .ok_or_else(|| EngineError::not_found("service", "<snapshot>"))?;

        let bookings: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|b| b.date == date)
            .cloned()
            .collect();

        available_slots(
            &self.windows(date)?,
            service.duration_minutes,
            config.step_for(service),
            &bookings,
        )
    }
}
