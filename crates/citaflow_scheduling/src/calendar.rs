// --- File: crates/citaflow_scheduling/src/calendar.rs ---
//! Calendar policy: business-day classification and backward shifting.
//!
//! Used only to compute cancellation deadlines. Availability-day selection
//! excludes non-business days, it never shifts them.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use std::collections::HashSet;
use thiserror::Error;

/// Upper bound on shift iterations. A well-formed holiday calendar reaches a
/// business day within a handful of steps; hitting the cap means the
/// configuration has no business day in range.
const MAX_SHIFT_ITERATIONS: u32 = 30;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CalendarPolicyError {
    #[error("no business day found within {0} days; check the holiday calendar")]
    NoBusinessDayInRange(u32),
}

/// A date is a business day unless it is Saturday, Sunday or a holiday.
pub fn is_business_day(date: NaiveDate, holidays: &HashSet<NaiveDate>) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) && !holidays.contains(&date)
}

/// Shift a timestamp backward to the nearest preceding business day,
/// preserving the time of day.
///
/// The rules apply in a fixed order per iteration: a holiday steps back one
/// day, then a Sunday steps back two days, then a Saturday steps back one
/// day. The order matters: a holiday falling on a Monday must land on the
/// prior Friday, not on the weekend.
pub fn shift_to_prior_business_day(
    timestamp: NaiveDateTime,
    holidays: &HashSet<NaiveDate>,
) -> Result<NaiveDateTime, CalendarPolicyError> {
    let mut shifted = timestamp;
    let mut iterations = 0;
    while !is_business_day(shifted.date(), holidays) {
        if iterations >= MAX_SHIFT_ITERATIONS {
            return Err(CalendarPolicyError::NoBusinessDayInRange(
                MAX_SHIFT_ITERATIONS,
            ));
        }
        if holidays.contains(&shifted.date()) {
            shifted -= Duration::days(1);
        }
        if shifted.weekday() == Weekday::Sun {
            shifted -= Duration::days(2);
        }
        if shifted.weekday() == Weekday::Sat {
            shifted -= Duration::days(1);
        }
        iterations += 1;
    }
    Ok(shifted)
}
