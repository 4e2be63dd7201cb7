//! The booking-request flow around the engine.
//!
//! Loads the provider's schedule, the service and the day's bookings from a
//! [`Repository`], then runs the two engine stages: [`resolve_windows`] and
//! [`available_slots`]. Booking goes through the same check and is committed
//! by the repository, which re-checks under its own lock before inserting.
//!
//! Callers that need to tell "closed" from "fully booked" should call
//! [`AvailabilityService::windows`] and [`AvailabilityService::slots`]
//! separately: closed means no windows, fully booked means windows but no slots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::booking::{Booking, BookingStatus, Service};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::ledger::{NewBooking, Repository};
use crate::schedule::{resolve_windows, ProviderSchedule};
use crate::slots::available_slots;
use crate::time::{Interval, TimeOfDay};

/// Which provider, service and date a client is asking about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    pub company_id: String,
    pub provider_id: String,
    pub service_id: String,
    pub date: NaiveDate,
}

/// Told about every new booking. Delivery is the implementor's business; the
/// flow does not wait on it or look at the outcome.
pub trait Notifier: Send + Sync {
    fn booking_created(&self, booking: &Booking);
}

/// Records notifications as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn booking_created(&self, booking: &Booking) {
        info!(
            id = %booking.id,
            provider = %booking.provider_id,
            date = %booking.date,
            start = %booking.interval.start(),
            "notify: new booking"
        );
    }
}

pub struct AvailabilityService<R, N = LogNotifier> {
    repository: R,
    notifier: N,
    config: EngineConfig,
}

impl<R: Repository> AvailabilityService<R, LogNotifier> {
    pub fn new(repository: R) -> Self {
        AvailabilityService {
            repository,
            notifier: LogNotifier,
            config: EngineConfig::default(),
        }
    }
}

impl<R: Repository, N: Notifier> AvailabilityService<R, N> {
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> AvailabilityService<R, M> {
        AvailabilityService {
            repository: self.repository,
            notifier,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn load_schedule(&self, company_id: &str, provider_id: &str) -> Result<ProviderSchedule> {
        let record = self
            .repository
            .schedule(company_id, provider_id)
            .ok_or_else(|| EngineError::not_found("provider schedule", provider_id))?;
        Ok(ProviderSchedule::try_from(record)?)
    }

    fn load_service(&self, company_id: &str, service_id: &str) -> Result<Service> {
        self.repository
            .service(company_id, service_id)
            .ok_or_else(|| EngineError::not_found("service", service_id))
    }

    /// Load, resolve and generate for one request. The returned service is
    /// the one the slots were generated with.
    fn offer(&self, request: &AvailabilityRequest) -> Result<(Service, Vec<TimeOfDay>)> {
        let schedule = self.load_schedule(&request.company_id, &request.provider_id)?;
        let service = self.load_service(&request.company_id, &request.service_id)?;
        let bookings = self.repository.bookings(&request.provider_id, request.date);

        let windows = resolve_windows(&schedule, request.date);
        let slots = available_slots(
            &windows,
            service.duration_minutes,
            self.config.step_for(&service),
            &bookings,
        )?;

        debug!(
            provider = %request.provider_id,
            service = %request.service_id,
            date = %request.date,
            slots = slots.len(),
            "resolved availability"
        );
        Ok((service, slots))
    }

    /// Working windows for the requested provider and date.
    ///
    /// # Errors
    /// `NotFound` without a stored schedule, `ScheduleConfig` when the stored
    /// schedule is malformed.
    pub fn windows(&self, company_id: &str, provider_id: &str, date: NaiveDate) -> Result<Vec<Interval>> {
        let schedule = self.load_schedule(company_id, provider_id)?;
        Ok(resolve_windows(&schedule, date))
    }

    /// Bookable start times for the request.
    ///
    /// # Errors
    /// `NotFound` for an unknown schedule or service, `ScheduleConfig` for a
    /// malformed schedule, `InvalidParameter` for a zero duration or step.
    pub fn slots(&self, request: &AvailabilityRequest) -> Result<Vec<TimeOfDay>> {
        let (_, slots) = self.offer(request)?;
        Ok(slots)
    }

    /// Book `start` for the request and notify.
    ///
    /// `start` must be one of the currently offered slots. The repository
    /// re-checks before committing, so a concurrent booking of the same time
    /// makes this fail with `SlotUnavailable` instead of double-booking.
    pub fn book(&self, request: &AvailabilityRequest, start: TimeOfDay) -> Result<Booking> {
        let unavailable = || EngineError::SlotUnavailable {
            date: request.date.to_string(),
            start: start.to_string(),
        };

        let (service, slots) = self.offer(request)?;
        if !slots.contains(&start) {
            return Err(unavailable());
        }

        let interval =
            Interval::starting_at(start, service.duration_minutes).ok_or_else(unavailable)?;

        let booking = self.repository.commit_booking(NewBooking {
            provider_id: request.provider_id.clone(),
            date: request.date,
            interval,
        })?;

        self.notifier.booking_created(&booking);
        Ok(booking)
    }

    pub fn update_status(&self, booking_id: &str, status: BookingStatus) -> Result<Booking> {
        self.repository.set_status(booking_id, status)
    }
}
