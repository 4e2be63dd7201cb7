//! Slot generation and conflict filtering.
//!
//! Walks each working window in `step`-minute increments, keeps every start
//! time whose `duration`-minute slot still ends inside the window, then drops
//! the ones that collide with an active booking. Candidates are returned in
//! start order with duplicates removed, even when the caller's windows are
//! unsorted or overlap.

use tracing::debug;

use crate::booking::Booking;
use crate::conflict::{ConflictCheck, LinearScan};
use crate::error::{EngineError, Result};
use crate::time::{Interval, TimeOfDay};

/// Candidate slots of `duration_minutes`, offered every `step_minutes`,
/// before any conflict filtering.
///
/// # Errors
/// `InvalidParameter` if either `duration_minutes` or `step_minutes` is zero.
pub fn candidate_slots(
    windows: &[Interval],
    duration_minutes: u32,
    step_minutes: u32,
) -> Result<Vec<Interval>> {
    check_positive("duration_minutes", duration_minutes)?;
    check_positive("step_minutes", step_minutes)?;

    let mut candidates = Vec::new();
    for window in windows {
        let mut start = Some(window.start());
        while let Some(candidate) = start {
            match Interval::starting_at(candidate, duration_minutes) {
                Some(slot) if slot.end() <= window.end() => candidates.push(slot),
                _ => break,
            }
            start = candidate.checked_add_minutes(step_minutes);
        }
    }

    // Every candidate has the same length, so equal starts are equal slots.
    candidates.sort();
    candidates.dedup();

    Ok(candidates)
}

/// Bookable start times for one provider and date.
///
/// Uses a [`LinearScan`] over `bookings`; only pending and confirmed bookings
/// block a slot. An empty result is a valid answer, not an error.
///
/// # Errors
/// `InvalidParameter` if either `duration_minutes` or `step_minutes` is zero.
pub fn available_slots(
    windows: &[Interval],
    duration_minutes: u32,
    step_minutes: u32,
    bookings: &[Booking],
) -> Result<Vec<TimeOfDay>> {
    available_slots_with(
        windows,
        duration_minutes,
        step_minutes,
        &LinearScan::new(bookings),
    )
}

/// [`available_slots`] with a caller-supplied conflict check.
pub fn available_slots_with<C>(
    windows: &[Interval],
    duration_minutes: u32,
    step_minutes: u32,
    conflicts: &C,
) -> Result<Vec<TimeOfDay>>
where
    C: ConflictCheck + ?Sized,
{
    let candidates = candidate_slots(windows, duration_minutes, step_minutes)?;
    let total = candidates.len();

    let slots: Vec<TimeOfDay> = candidates
        .into_iter()
        .filter(|slot| !conflicts.conflicts(slot))
        .map(|slot| slot.start())
        .collect();

    debug!(
        windows = windows.len(),
        candidates = total,
        available = slots.len(),
        "generated slots"
    );

    Ok(slots)
}

fn check_positive(name: &str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(EngineError::InvalidParameter(format!(
            "{} must be greater than zero",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_step_is_rejected() {
        let w = [Interval::parse("09:00", "10:00").unwrap()];
        assert!(candidate_slots(&w, 30, 0).is_err());
        assert!(candidate_slots(&w, 0, 30).is_err());
    }

    #[test]
    fn window_ending_at_last_minute_of_day() {
        let w = [Interval::parse("22:59", "23:59").unwrap()];
        let slots = candidate_slots(&w, 60, 15).unwrap();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].start().to_string(), "22:59");
    }
}
