//! # slot-engine
//!
//! Availability resolution for appointment booking.
//!
//! Given a provider's recurring weekly schedule, date-specific exceptions, a
//! calendar date and a service duration, the engine computes the ordered list
//! of start times that can still be booked, leaving out anything that collides
//! with a pending or confirmed booking. All computation is pure and works on
//! immutable snapshots, so it is safe to call from many threads at once.
//!
//! ## Modules
//!
//! - [`time`] — `TimeOfDay`, `Interval`, `DayOfWeek` and minute arithmetic
//! - [`schedule`] — validated provider schedules and the window resolver
//! - [`slots`] — candidate generation and conflict filtering
//! - [`conflict`] — overlap detection against existing bookings
//! - [`booking`] — bookings, statuses and services
//! - [`ledger`] — repository seam and an in-memory booking ledger
//! - [`availability`] — the request flow: load, resolve, generate, book
//! - [`snapshot`] — JSON input bundle for the CLI and WASM bindings
//! - [`config`] — step granularity
//! - [`error`] — Error types

pub mod availability;
pub mod booking;
pub mod config;
pub mod conflict;
pub mod error;
pub mod ledger;
pub mod schedule;
pub mod slots;
pub mod snapshot;
pub mod time;

pub use availability::{AvailabilityRequest, AvailabilityService, LogNotifier, Notifier};
pub use booking::{Booking, BookingStatus, Service};
pub use config::EngineConfig;
pub use conflict::{find_conflicts, ConflictCheck, LinearScan};
pub use error::{EngineError, ScheduleConfigError};
pub use ledger::{InMemoryRepository, Repository};
pub use schedule::{resolve_windows, DayEntry, ProviderSchedule, ScheduleRecord, WeeklyTemplate};
pub use slots::{available_slots, available_slots_with};
pub use snapshot::Snapshot;
pub use time::{DayOfWeek, Interval, TimeOfDay};
