//! Bookings and services as supplied by the booking ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::Interval;

/// Lifecycle of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Canceled,
    Completed,
}

impl BookingStatus {
    /// Only pending and confirmed bookings hold their time. Canceled bookings
    /// released it and completed ones are history.
    pub fn occupies_time(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// One booking of a provider on a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default)]
    pub id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub interval: Interval,
    pub status: BookingStatus,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.occupies_time()
    }
}

/// A bookable service. `duration_minutes` sizes every offered slot;
/// `step_minutes`, when set, overrides the engine's default spacing between
/// offered start times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,
    #[serde(default)]
    pub company_id: String,
    #[serde(default)]
    pub name: String,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_minutes: Option<u32>,
}
