//! Detect candidate slots that collide with existing bookings.
//!
//! Overlap is half-open: a slot that ends exactly when a booking starts (or
//! starts exactly when one ends) is NOT a conflict. Only bookings whose status
//! occupies time (pending, confirmed) are considered.

use crate::booking::Booking;
use crate::time::Interval;

/// Decides whether a candidate slot collides with something already booked.
///
/// The slot generator is written against this trait so an indexed lookup can
/// replace the linear scan without touching slot generation.
pub trait ConflictCheck {
    fn conflicts(&self, slot: &Interval) -> bool;
}

impl<F> ConflictCheck for F
where
    F: Fn(&Interval) -> bool,
{
    fn conflicts(&self, slot: &Interval) -> bool {
        self(slot)
    }
}

/// Pairwise scan over the active bookings of one provider and day.
#[derive(Debug, Clone)]
pub struct LinearScan<'a> {
    active: Vec<&'a Booking>,
}

impl<'a> LinearScan<'a> {
    /// Keeps pending and confirmed bookings; canceled and completed ones are
    /// dropped here and never block a slot.
    pub fn new(bookings: &'a [Booking]) -> Self {
        LinearScan {
            active: bookings.iter().filter(|b| b.is_active()).collect(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl ConflictCheck for LinearScan<'_> {
    fn conflicts(&self, slot: &Interval) -> bool {
        self.active.iter().any(|b| b.interval.overlaps(slot))
    }
}

/// A booking that overlaps a requested slot.
#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub booking: &'a Booking,
    pub overlap_minutes: u32,
}

/// Every active booking that overlaps `slot`, with the shared minutes.
pub fn find_conflicts<'a>(slot: &Interval, bookings: &'a [Booking]) -> Vec<Conflict<'a>> {
    bookings
        .iter()
        .filter(|b| b.is_active())
        .filter_map(|booking| {
            let overlap_minutes = booking.interval.overlap_minutes(slot);
            (overlap_minutes > 0).then_some(Conflict {
                booking,
                overlap_minutes,
            })
        })
        .collect()
}
