// --- File: crates/citaflow_scheduling/src/availability.rs ---
//! Pure availability arithmetic: bookable-day iteration and candidate slot
//! grids. Everything here is a function of already-fetched data; the engine
//! layers the store-backed filters (blocked hours, capacity) on top.

use crate::models::{BlockedHour, WeekdayMask};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::collections::HashSet;
use thiserror::Error;

use crate::calendar::is_business_day;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AvailabilityError {
    #[error("service duration must be positive, got {0} minutes")]
    NonPositiveDuration(i64),
    #[error("service window is empty: opens {open} closes {close}")]
    EmptyWindow { open: NaiveTime, close: NaiveTime },
}

/// Lazily walks forward from a starting day over a fixed horizon, yielding
/// the days on which a service can be booked: business days whose weekday the
/// service allows. Restartable by cloning.
#[derive(Debug, Clone)]
pub struct AvailableDays {
    next: NaiveDate,
    remaining: u32,
    weekdays: WeekdayMask,
    holidays: HashSet<NaiveDate>,
}

impl AvailableDays {
    pub fn new(
        from: NaiveDate,
        horizon_days: u32,
        weekdays: WeekdayMask,
        holidays: HashSet<NaiveDate>,
    ) -> Self {
        Self {
            next: from,
            remaining: horizon_days,
            weekdays,
            holidays,
        }
    }
}

impl Iterator for AvailableDays {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        while self.remaining > 0 {
            let day = self.next;
            self.next += Duration::days(1);
            self.remaining -= 1;
            if is_business_day(day, &self.holidays) && self.weekdays.allows(day.weekday()) {
                return Some(day);
            }
        }
        None
    }
}

/// Candidate slot start times for one day: steps of the service duration from
/// the effective opening time, while the whole slot still fits before close.
///
/// Construction validates the service configuration; a malformed duration or
/// window is a configuration error surfaced here, not per request.
#[derive(Debug, Clone, Copy)]
pub struct SlotGrid {
    open: NaiveTime,
    close: NaiveTime,
    duration: Duration,
}

impl SlotGrid {
    pub fn new(
        open: NaiveTime,
        close: NaiveTime,
        duration_minutes: i64,
    ) -> Result<Self, AvailabilityError> {
        if duration_minutes <= 0 {
            return Err(AvailabilityError::NonPositiveDuration(duration_minutes));
        }
        let duration = Duration::minutes(duration_minutes);
        // NaiveTime addition wraps at midnight, so "fits before close" has to
        // be checked with the non-wrapping add.
        match slot_end(open, duration) {
            Some(end) if end <= close => Ok(Self {
                open,
                close,
                duration,
            }),
            _ => Err(AvailabilityError::EmptyWindow { open, close }),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Ordered candidate start times.
    pub fn starts(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        let mut current = Some(self.open);
        let grid = *self;
        std::iter::from_fn(move || {
            let start = current?;
            current = slot_end(start, grid.duration).filter(|next| {
                slot_end(*next, grid.duration).is_some_and(|end| end <= grid.close)
            });
            Some(start)
        })
    }
}

/// End of a slot starting at `start`, or `None` when it would cross midnight.
fn slot_end(start: NaiveTime, duration: Duration) -> Option<NaiveTime> {
    match start.overflowing_add_signed(duration) {
        (end, 0) => Some(end),
        _ => None,
    }
}

/// Half-open interval intersection on times within one day.
pub fn intervals_overlap(
    a_start: NaiveTime,
    a_end: NaiveTime,
    b_start: NaiveTime,
    b_end: NaiveTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Whether a candidate slot falls inside any blocked-hour range for the day.
pub fn slot_is_blocked(start: NaiveTime, end: NaiveTime, blocked: &[BlockedHour]) -> bool {
    blocked
        .iter()
        .any(|b| intervals_overlap(start, end, b.start_time, b.end_time))
}
