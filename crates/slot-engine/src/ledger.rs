//! The storage collaborator: schedules, services, and the booking ledger.
//!
//! The engine itself only reads snapshots. [`Repository`] is the seam through
//! which the request flow loads those snapshots and commits new bookings.
//! [`InMemoryRepository`] is a thread-safe implementation for tests, demos and
//! single-process deployments.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::booking::{Booking, BookingStatus, Service};
use crate::conflict::{find_conflicts, ConflictCheck, LinearScan};
use crate::error::{EngineError, Result};
use crate::schedule::{ProviderSchedule, ScheduleRecord};
use crate::time::Interval;

/// A booking that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub provider_id: String,
    pub date: NaiveDate,
    pub interval: Interval,
}

pub trait Repository: Send + Sync {
    /// The stored schedule for a provider of a company, if any.
    fn schedule(&self, company_id: &str, provider_id: &str) -> Option<ScheduleRecord>;

    fn service(&self, company_id: &str, service_id: &str) -> Option<Service>;

    /// All bookings of `provider_id` on `date`, whatever their status.
    fn bookings(&self, provider_id: &str, date: NaiveDate) -> Vec<Booking>;

    /// Store `booking` as pending.
    ///
    /// Implementations must re-check for conflicts and insert atomically, so
    /// that of two requests racing for the same slot at most one wins.
    ///
    /// # Errors
    /// `SlotUnavailable` if an active booking already overlaps the interval.
    fn commit_booking(&self, booking: NewBooking) -> Result<Booking>;

    /// # Errors
    /// `BookingNotFound` for an unknown id.
    fn set_status(&self, booking_id: &str, status: BookingStatus) -> Result<Booking>;
}

#[derive(Debug, Default)]
struct Store {
    schedules: HashMap<(String, String), ScheduleRecord>,
    services: HashMap<(String, String), Service>,
    bookings: Vec<Booking>,
}

/// In-process [`Repository`] behind a single `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Save a validated schedule, replacing the provider's previous one.
    pub fn save_schedule(&self, company_id: &str, provider_id: &str, schedule: &ProviderSchedule) {
        self.insert_schedule_record(company_id, provider_id, schedule.clone().into());
    }

    /// Store a raw record as-is, without validation. Reading it back through
    /// the request flow surfaces any configuration error it carries.
    pub fn insert_schedule_record(&self, company_id: &str, provider_id: &str, record: ScheduleRecord) {
        self.write()
            .schedules
            .insert((company_id.to_string(), provider_id.to_string()), record);
    }

    pub fn add_service(&self, service: Service) {
        self.write()
            .services
            .insert((service.company_id.clone(), service.id.clone()), service);
    }

    /// Seed an existing booking. An empty id is replaced with a generated one.
    pub fn insert_booking(&self, mut booking: Booking) -> Booking {
        if booking.id.is_empty() {
            booking.id = self.generate_id();
        }
        self.write().bookings.push(booking.clone());
        booking
    }

    fn generate_id(&self) -> String {
        format!("b{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

impl Repository for InMemoryRepository {
    fn schedule(&self, company_id: &str, provider_id: &str) -> Option<ScheduleRecord> {
        self.read()
            .schedules
            .get(&(company_id.to_string(), provider_id.to_string()))
            .cloned()
    }

    fn service(&self, company_id: &str, service_id: &str) -> Option<Service> {
        self.read()
            .services
            .get(&(company_id.to_string(), service_id.to_string()))
            .cloned()
    }

    fn bookings(&self, provider_id: &str, date: NaiveDate) -> Vec<Booking> {
        self.read()
            .bookings
            .iter()
            .filter(|b| b.provider_id == provider_id && b.date == date)
            .cloned()
            .collect()
    }

    fn commit_booking(&self, booking: NewBooking) -> Result<Booking> {
        let mut store = self.write();

        let same_day: Vec<Booking> = store
            .bookings
            .iter()
            .filter(|b| b.provider_id == booking.provider_id && b.date == booking.date)
            .cloned()
            .collect();

        if LinearScan::new(&same_day).conflicts(&booking.interval) {
            let blocking: Vec<&str> = find_conflicts(&booking.interval, &same_day)
                .iter()
                .map(|c| c.booking.id.as_str())
                .collect();
            warn!(
                provider = %booking.provider_id,
                date = %booking.date,
                slot = %booking.interval,
                ?blocking,
                "booking rejected: slot taken"
            );
            return Err(EngineError::SlotUnavailable {
                date: booking.date.to_string(),
                start: booking.interval.start().to_string(),
            });
        }

        let committed = Booking {
            id: self.generate_id(),
            provider_id: booking.provider_id,
            date: booking.date,
            interval: booking.interval,
            status: BookingStatus::Pending,
        };
        store.bookings.push(committed.clone());

        info!(
            id = %committed.id,
            provider = %committed.provider_id,
            date = %committed.date,
            slot = %committed.interval,
            "booking committed"
        );
        Ok(committed)
    }

    fn set_status(&self, booking_id: &str, status: BookingStatus) -> Result<Booking> {
        let mut store = self.write();
        let booking = store
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| EngineError::BookingNotFound(booking_id.to_string()))?;

        info!(id = %booking.id, from = ?booking.status, to = ?status, "booking status changed");
        booking.status = status;
        Ok(booking.clone())
    }
}
