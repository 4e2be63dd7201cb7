//! Tests for the booking-request flow and the in-memory ledger.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use chrono::NaiveDate;
use slot_engine::ledger::{NewBooking, Repository};
use slot_engine::schedule::DayRecord;
use slot_engine::{
    AvailabilityRequest, AvailabilityService, Booking, BookingStatus, DayEntry, EngineConfig,
    EngineError, InMemoryRepository, Interval, Notifier, ProviderSchedule, ScheduleRecord,
    Service, TimeOfDay, WeeklyTemplate,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

const COMPANY: &str = "c1";
const PROVIDER: &str = "p3";

/// Monday 2026-03-16.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 16).unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn render(slots: &[TimeOfDay]) -> Vec<String> {
    slots.iter().map(|t| t.to_string()).collect()
}

fn service(id: &str, duration: u32, step: Option<u32>) -> Service {
    Service {
        id: id.to_string(),
        company_id: COMPANY.to_string(),
        name: format!("service {}", id),
        duration_minutes: duration,
        step_minutes: step,
    }
}

fn seeded_repository() -> InMemoryRepository {
    let repo = InMemoryRepository::new();
    repo.save_schedule(
        COMPANY,
        PROVIDER,
        &ProviderSchedule::new(WeeklyTemplate::business_hours()),
    );
    repo.add_service(service("s1", 60, None));
    repo.add_service(service("s2", 30, None));
    repo
}

fn request(service_id: &str, date: NaiveDate) -> AvailabilityRequest {
    AvailabilityRequest {
        company_id: COMPANY.to_string(),
        provider_id: PROVIDER.to_string(),
        service_id: service_id.to_string(),
        date,
    }
}

#[derive(Default, Clone)]
struct RecordingNotifier {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Notifier for RecordingNotifier {
    fn booking_created(&self, booking: &Booking) {
        self.seen.lock().unwrap().push(booking.id.clone());
    }
}

/// Delegates to an in-memory ledger and counts service lookups.
struct CountingRepository {
    inner: InMemoryRepository,
    service_loads: AtomicUsize,
}

impl Repository for CountingRepository {
    fn schedule(&self, company_id: &str, provider_id: &str) -> Option<ScheduleRecord> {
        self.inner.schedule(company_id, provider_id)
    }

    fn service(&self, company_id: &str, service_id: &str) -> Option<Service> {
        self.service_loads.fetch_add(1, Ordering::SeqCst);
        self.inner.service(company_id, service_id)
    }

    fn bookings(&self, provider_id: &str, date: NaiveDate) -> Vec<Booking> {
        self.inner.bookings(provider_id, date)
    }

    fn commit_booking(&self, booking: NewBooking) -> slot_engine::error::Result<Booking> {
        self.inner.commit_booking(booking)
    }

    fn set_status(&self, booking_id: &str, status: BookingStatus) -> slot_engine::error::Result<Booking> {
        self.inner.set_status(booking_id, status)
    }
}

// ── Lookup ──────────────────────────────────────────────────────────────────

#[test]
fn slots_for_business_hours_monday() {
    let svc = AvailabilityService::new(seeded_repository());

    let slots = svc.slots(&request("s1", monday())).unwrap();

    assert_eq!(
        render(&slots),
        [
            "09:00", "09:30", "10:00", "10:30", "11:00", "13:00", "13:30", "14:00", "14:30",
            "15:00", "15:30", "16:00"
        ]
    );
}

#[test]
fn existing_bookings_are_excluded() {
    let repo = seeded_repository();
    repo.insert_booking(Booking {
        id: String::new(),
        provider_id: PROVIDER.to_string(),
        date: monday(),
        interval: Interval::parse("10:00", "11:00").unwrap(),
        status: BookingStatus::Confirmed,
    });
    let svc = AvailabilityService::new(repo);

    let slots = svc.slots(&request("s1", monday())).unwrap();

    assert!(!slots.contains(&t("09:30")));
    assert!(!slots.contains(&t("10:00")));
    assert!(!slots.contains(&t("10:30")));
    assert!(slots.contains(&t("09:00")));
    assert!(slots.contains(&t("11:00")));
}

#[test]
fn bookings_of_other_providers_and_dates_do_not_block() {
    let repo = seeded_repository();
    repo.insert_booking(Booking {
        id: String::new(),
        provider_id: "someone-else".to_string(),
        date: monday(),
        interval: Interval::parse("09:00", "17:00").unwrap(),
        status: BookingStatus::Confirmed,
    });
    repo.insert_booking(Booking {
        id: String::new(),
        provider_id: PROVIDER.to_string(),
        date: monday().succ_opt().unwrap(),
        interval: Interval::parse("09:00", "17:00").unwrap(),
        status: BookingStatus::Confirmed,
    });
    let svc = AvailabilityService::new(repo);

    assert_eq!(svc.slots(&request("s1", monday())).unwrap().len(), 12);
}

#[test]
fn closed_day_versus_fully_booked_day() {
    let repo = seeded_repository();
    repo.insert_booking(Booking {
        id: String::new(),
        provider_id: PROVIDER.to_string(),
        date: monday(),
        interval: Interval::parse("09:00", "17:00").unwrap(),
        status: BookingStatus::Pending,
    });
    let svc = AvailabilityService::new(repo);
    let sunday = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

    // Closed: no windows at all.
    assert!(svc.windows(COMPANY, PROVIDER, sunday).unwrap().is_empty());
    assert!(svc.slots(&request("s1", sunday)).unwrap().is_empty());

    // Fully booked: windows exist but nothing survives.
    assert!(!svc.windows(COMPANY, PROVIDER, monday()).unwrap().is_empty());
    assert!(svc.slots(&request("s1", monday())).unwrap().is_empty());
}

#[test]
fn unknown_service_is_not_found() {
    let svc = AvailabilityService::new(seeded_repository());

    let err = svc.slots(&request("nope", monday())).unwrap_err();

    assert!(matches!(err, EngineError::NotFound { kind: "service", .. }));
}

#[test]
fn unknown_provider_is_not_found() {
    let svc = AvailabilityService::new(seeded_repository());
    let mut req = request("s1", monday());
    req.provider_id = "ghost".to_string();

    let err = svc.slots(&req).unwrap_err();

    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[test]
fn corrupt_stored_schedule_surfaces_config_error() {
    let repo = seeded_repository();
    repo.insert_schedule_record(
        COMPANY,
        PROVIDER,
        ScheduleRecord {
            weekly: vec![DayRecord {
                day_of_week: 1,
                is_open: true,
                windows: vec![Interval::parse("09:00", "17:00").unwrap()],
            }],
            exceptions: vec![],
        },
    );
    let svc = AvailabilityService::new(repo);

    let err = svc.slots(&request("s1", monday())).unwrap_err();

    assert!(matches!(err, EngineError::ScheduleConfig(_)));
}

#[test]
fn per_service_step_overrides_engine_default() {
    let repo = seeded_repository();
    repo.add_service(service("s3", 60, Some(60)));
    let svc = AvailabilityService::new(repo);

    let slots = svc.slots(&request("s3", monday())).unwrap();

    assert_eq!(
        render(&slots),
        ["09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00"]
    );
}

#[test]
fn engine_default_step_comes_from_config() {
    let config = EngineConfig::from_json(r#"{"defaultStepMinutes": 90}"#).unwrap();
    let svc = AvailabilityService::new(seeded_repository()).with_config(config);

    let slots = svc.slots(&request("s1", monday())).unwrap();

    assert_eq!(render(&slots), ["09:00", "10:30", "13:00", "14:30", "16:00"]);
}

#[test]
fn missing_config_fields_fall_back_to_defaults() {
    let config = EngineConfig::from_json("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.default_step_minutes, 30);
}

#[test]
fn zero_default_step_is_rejected_at_load() {
    let err = EngineConfig::from_json(r#"{"defaultStepMinutes": 0}"#).unwrap_err();

    assert!(matches!(err, EngineError::InvalidParameter(_)));
}

#[test]
fn holiday_exception_closes_the_day() {
    let repo = seeded_repository();
    let schedule = ProviderSchedule::new(WeeklyTemplate::business_hours())
        .with_exception(monday(), DayEntry::closed());
    repo.save_schedule(COMPANY, PROVIDER, &schedule);
    let svc = AvailabilityService::new(repo);

    assert!(svc.slots(&request("s1", monday())).unwrap().is_empty());
}

// ── Booking ─────────────────────────────────────────────────────────────────

#[test]
fn booking_takes_the_slot_and_notifies() {
    let notifier = RecordingNotifier::default();
    let svc = AvailabilityService::new(seeded_repository()).with_notifier(notifier.clone());
    let req = request("s1", monday());

    let booking = svc.book(&req, t("10:00")).unwrap();

    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.interval, Interval::parse("10:00", "11:00").unwrap());
    assert_eq!(*notifier.seen.lock().unwrap(), vec![booking.id.clone()]);

    let slots = svc.slots(&req).unwrap();
    assert!(!slots.contains(&t("10:00")));
    assert!(!slots.contains(&t("09:30")));
    assert!(slots.contains(&t("09:00")));
    assert!(slots.contains(&t("11:00")));
}

#[test]
fn booking_an_unoffered_time_fails() {
    let svc = AvailabilityService::new(seeded_repository());
    let req = request("s1", monday());

    // Lunch break, and off the step grid.
    for start in ["12:00", "09:10"] {
        let err = svc.book(&req, t(start)).unwrap_err();
        assert!(matches!(err, EngineError::SlotUnavailable { .. }));
    }
}

#[test]
fn second_booking_of_same_slot_fails() {
    let svc = AvailabilityService::new(seeded_repository());
    let req = request("s1", monday());

    svc.book(&req, t("14:00")).unwrap();
    let err = svc.book(&req, t("14:00")).unwrap_err();

    assert!(matches!(err, EngineError::SlotUnavailable { .. }));
}

#[test]
fn booking_reads_the_service_once() {
    let repo = CountingRepository {
        inner: seeded_repository(),
        service_loads: AtomicUsize::new(0),
    };
    let svc = AvailabilityService::new(repo);

    let booking = svc.book(&request("s1", monday()), t("13:00")).unwrap();

    assert_eq!(booking.interval, Interval::parse("13:00", "14:00").unwrap());
    assert_eq!(svc.repository().service_loads.load(Ordering::SeqCst), 1);
}

#[test]
fn ledger_recheck_rejects_overlapping_commit() {
    let repo = seeded_repository();
    repo.insert_booking(Booking {
        id: "existing".to_string(),
        provider_id: PROVIDER.to_string(),
        date: monday(),
        interval: Interval::parse("09:30", "10:30").unwrap(),
        status: BookingStatus::Confirmed,
    });

    let err = repo
        .commit_booking(NewBooking {
            provider_id: PROVIDER.to_string(),
            date: monday(),
            interval: Interval::parse("09:00", "10:00").unwrap(),
        })
        .unwrap_err();

    assert!(matches!(err, EngineError::SlotUnavailable { .. }));
}

#[test]
fn concurrent_bookings_have_one_winner() {
    let svc = Arc::new(AvailabilityService::new(seeded_repository()));
    let req = request("s1", monday());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let svc = Arc::clone(&svc);
            let req = req.clone();
            thread::spawn(move || svc.book(&req, t("15:00")).is_ok())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();

    assert_eq!(winners, 1);
    assert_eq!(svc.repository().bookings(PROVIDER, monday()).len(), 1);
}

#[test]
fn canceling_frees_the_slot() {
    let svc = AvailabilityService::new(seeded_repository());
    let req = request("s1", monday());
    let booking = svc.book(&req, t("09:00")).unwrap();
    assert!(!svc.slots(&req).unwrap().contains(&t("09:00")));

    let canceled = svc.update_status(&booking.id, BookingStatus::Canceled).unwrap();

    assert_eq!(canceled.status, BookingStatus::Canceled);
    assert!(svc.slots(&req).unwrap().contains(&t("09:00")));
}

#[test]
fn confirming_keeps_the_slot_blocked() {
    let svc = AvailabilityService::new(seeded_repository());
    let req = request("s2", monday());
    let booking = svc.book(&req, t("16:30")).unwrap();

    svc.update_status(&booking.id, BookingStatus::Confirmed).unwrap();

    assert!(!svc.slots(&req).unwrap().contains(&t("16:30")));
}

#[test]
fn updating_unknown_booking_fails() {
    let svc = AvailabilityService::new(seeded_repository());

    let err = svc.update_status("missing", BookingStatus::Completed).unwrap_err();

    assert!(matches!(err, EngineError::BookingNotFound(_)));
}

#[test]
fn booking_serializes_with_flat_times() {
    let booking = Booking {
        id: "b1".to_string(),
        provider_id: PROVIDER.to_string(),
        date: monday(),
        interval: Interval::parse("10:00", "11:00").unwrap(),
        status: BookingStatus::Confirmed,
    };

    let json = serde_json::to_value(&booking).unwrap();

    assert_eq!(json["date"], "2026-03-16");
    assert_eq!(json["start"], "10:00");
    assert_eq!(json["end"], "11:00");
    assert_eq!(json["status"], "CONFIRMED");
    assert_eq!(json["providerId"], PROVIDER);
}
