//! # Free Slot Computation
//!
//! Given a master's working window for one day, the bookings that already
//! occupy it and a service duration, this module works out which start times
//! are still bookable.
//!
//! ## Algorithm
//!
//! 1. Enumerate candidates every `step` from the window start up to
//!    `window.end - duration`, inclusive
//! 2. Drop candidates whose padded interval overlaps an existing booking
//! 3. Drop candidates that do not start after `now`
//!
//! All intervals are half-open (`[start, end)`), so a candidate that ends
//! exactly when a booking starts is free.
//!
//! ## Break padding
//!
//! A master's break applies on both sides of every booking. Each stored
//! booking already carries its trailing pad in `blocked_until`; a candidate
//! carries its own pad by extending its end by the break. Comparing
//! `[s, s + duration + break)` with `[booking.start, booking.blocked_until)`
//! is equivalent to padding the booking on both sides, and it is exactly the
//! range the storage-level exclusion constraint compares.

use chrono::{DateTime, Duration, Utc};

use crate::errors::{SalonError, SalonResult};
use crate::models::appointment::{Appointment, NewTimes};
use crate::models::work_schedule::WorkingWindow;

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Interval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl From<&Appointment> for Interval {
    /// The range a booking protects, including its trailing break.
    fn from(appointment: &Appointment) -> Self {
        Interval::new(appointment.start_time, appointment.blocked_until)
    }
}

/// Tuning for slot enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotParams {
    pub duration: Duration,
    pub step: Duration,
    pub break_padding: Duration,
}

impl SlotParams {
    pub fn validate(&self) -> SalonResult<()> {
        if self.duration <= Duration::zero() {
            return Err(SalonError::Validation(
                "Service duration must be positive".to_string(),
            ));
        }
        if self.step <= Duration::zero() {
            return Err(SalonError::Validation(
                "Slot step must be positive".to_string(),
            ));
        }
        if self.break_padding < Duration::zero() {
            return Err(SalonError::Validation(
                "Break duration cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// End, and end plus break, of a booking starting at `start`.
    ///
    /// `None` when either instant falls outside the representable range.
    pub fn booking_times(&self, start: DateTime<Utc>) -> Option<NewTimes> {
        let end_time = start.checked_add_signed(self.duration)?;
        let blocked_until = end_time.checked_add_signed(self.break_padding)?;
        Some(NewTimes {
            start_time: start,
            end_time,
            blocked_until,
        })
    }

    /// The range a booking starting at `start` would protect.
    pub fn guarded_interval(&self, start: DateTime<Utc>) -> Option<Interval> {
        self.booking_times(start)
            .map(|times| Interval::new(times.start_time, times.blocked_until))
    }
}

/// Returns the first booking whose protected range collides with `candidate`.
pub fn find_conflict<'a>(
    candidate: &Interval,
    bookings: &'a [Appointment],
) -> Option<&'a Appointment> {
    bookings
        .iter()
        .filter(|b| b.status.occupies_slot())
        .find(|b| candidate.overlaps(&Interval::from(*b)))
}

/// Computes the bookable start times inside `window`.
///
/// The result is strictly ascending; every entry `s` satisfies
/// `s > now`, `s >= window.start` and `s + duration <= window.end`.
/// Cancelled bookings in `bookings` are ignored.
pub fn compute_free_slots(
    window: &WorkingWindow,
    bookings: &[Appointment],
    params: &SlotParams,
    now: DateTime<Utc>,
) -> SalonResult<Vec<DateTime<Utc>>> {
    params.validate()?;

    let mut slots = Vec::new();
    if window.end - window.start < params.duration {
        return Ok(slots);
    }

    let last_start = window.end - params.duration;
    let mut candidate = window.start;
    while candidate <= last_start {
        if candidate > now {
            let free = params
                .guarded_interval(candidate)
                .is_some_and(|guarded| find_conflict(&guarded, bookings).is_none());
            if free {
                slots.push(candidate);
            }
        }
        let Some(next) = candidate.checked_add_signed(params.step) else {
            break;
        };
        candidate = next;
    }

    Ok(slots)
}
