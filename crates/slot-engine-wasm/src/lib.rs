//! WASM bindings for slot-engine.
//!
//! Exposes schedule validation, window resolution and slot generation to the
//! booking front-end via `wasm-bindgen`. All complex types are passed as JSON
//! strings; times are `"HH:MM"` and dates `"YYYY-MM-DD"`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p slot-engine-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target web --out-dir packages/slot-engine-js/wasm/ \
//!   target/wasm32-unknown-unknown/release/slot_engine_wasm.wasm
//! ```

use chrono::NaiveDate;
use serde::Serialize;
use slot_engine::error::ScheduleConfigError;
use slot_engine::{
    Booking, DayEntry, EngineConfig, Interval, ProviderSchedule, Snapshot, TimeOfDay,
};
use wasm_bindgen::prelude::*;

// ---------------------------------------------------------------------------
// Serde-friendly DTOs for crossing the WASM boundary as JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct ValidationDto {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse a `"YYYY-MM-DD"` calendar date.
fn parse_date(s: &str) -> Result<NaiveDate, JsValue> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", s, e)))
}

/// Sort caller-supplied windows and reject overlaps. An empty list is a
/// closed day.
fn open_windows(windows: Vec<Interval>) -> Result<DayEntry, ScheduleConfigError> {
    if windows.is_empty() {
        return Ok(DayEntry::closed());
    }
    DayEntry::open(windows)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ---------------------------------------------------------------------------
// WASM exports
// ---------------------------------------------------------------------------

/// Check a stored schedule before saving it.
///
/// Returns `{"valid": true}` or `{"valid": false, "error": "..."}`; never
/// throws for a malformed schedule, only for input that is not JSON at all.
#[wasm_bindgen(js_name = "validateSchedule")]
pub fn validate_schedule(schedule_json: &str) -> Result<String, JsValue> {
    let value: serde_json::Value = serde_json::from_str(schedule_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid schedule JSON: {}", e)))?;

    let dto = match serde_json::from_value::<ProviderSchedule>(value) {
        Ok(_) => ValidationDto {
            valid: true,
            error: None,
        },
        Err(e) => ValidationDto {
            valid: false,
            error: Some(e.to_string()),
        },
    };
    to_json(&dto)
}

/// Working windows of a stored schedule on `date`.
///
/// Returns a JSON array of `{start, end}` objects, empty when closed.
#[wasm_bindgen(js_name = "resolveWindows")]
pub fn resolve_windows(schedule_json: &str, date: &str) -> Result<String, JsValue> {
    let schedule: ProviderSchedule = serde_json::from_str(schedule_json).map_err(js_err)?;
    let date = parse_date(date)?;

    to_json(&slot_engine::resolve_windows(&schedule, date))
}

/// Bookable start times inside `windows_json`.
///
/// `windows_json` is a JSON array of `{start, end}` in any order; overlapping
/// windows are rejected. `bookings_json` is a JSON array of bookings
/// (`{providerId, date, start, end, status}`). Returns a JSON array of
/// `"HH:MM"` strings.
#[wasm_bindgen(js_name = "availableSlots")]
pub fn available_slots(
    windows_json: &str,
    duration_minutes: u32,
    step_minutes: u32,
    bookings_json: &str,
) -> Result<String, JsValue> {
    let windows: Vec<Interval> = serde_json::from_str(windows_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid windows JSON: {}", e)))?;
    let bookings: Vec<Booking> = serde_json::from_str(bookings_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid bookings JSON: {}", e)))?;

    let day = open_windows(windows).map_err(js_err)?;
    let slots: Vec<TimeOfDay> =
        slot_engine::available_slots(day.windows(), duration_minutes, step_minutes, &bookings)
            .map_err(js_err)?;
    to_json(&slots)
}

/// Resolve and filter in one call from a snapshot
/// (`{schedule, service, bookings}`).
///
/// `step_minutes` of 0 means "use the service's step, or 30".
#[wasm_bindgen(js_name = "snapshotSlots")]
pub fn snapshot_slots(snapshot_json: &str, date: &str, step_minutes: u32) -> Result<String, JsValue> {
    let snapshot = Snapshot::from_json(snapshot_json).map_err(js_err)?;
    let date = parse_date(date)?;

    let mut config = EngineConfig::default();
    if step_minutes > 0 {
        config.default_step_minutes = step_minutes;
    }

    to_json(&snapshot.slots(date, &config).map_err(js_err)?)
}
