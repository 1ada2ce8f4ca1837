// --- File: crates/citaflow_scheduling/src/booking.rs ---
//! Booking transaction types: the request shape, the structured failure
//! taxonomy and the notes sanitizer. The orchestration itself lives in
//! [`crate::engine::SchedulingEngine::book`].

use crate::availability::AvailabilityError;
use crate::calendar::CalendarPolicyError;
use crate::store::StoreError;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of entity a NotFound/Inactive outcome refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Office,
    Service,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Office => f.write_str("office"),
            EntityKind::Service => f.write_str("service"),
        }
    }
}

/// Every declared outcome of a failed booking. All variants are expected,
/// recoverable results surfaced to the caller; only `Store` is server-side.
#[derive(Error, Debug)]
pub enum BookingError {
    #[error("{kind} {code:?} does not exist")]
    NotFound { kind: EntityKind, code: String },
    #[error("{kind} {code:?} is not active")]
    Inactive { kind: EntityKind, code: String },
    #[error("the service is not offered at that office")]
    NotOffered,
    #[error("the requested date is not available")]
    InvalidDate,
    #[error("the requested time slot is not available")]
    InvalidSlot,
    #[error("the office has reached its capacity for that slot")]
    OfficeFull,
    #[error("the client has reached the pending-appointment limit")]
    ClientLimitReached,
    #[error("the client already has a pending appointment at that time")]
    ClientConflict,
    #[error(transparent)]
    Calendar(#[from] CalendarPolicyError),
    #[error(transparent)]
    Availability(#[from] AvailabilityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Inputs of the booking transaction.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRequest {
    /// Office short code, e.g. "OF1".
    pub office_code: String,
    /// Service short code, e.g. "SV1".
    pub service_code: String,
    /// Target day, must be a member of the bookable-days set.
    pub date: NaiveDate,
    /// Target slot start, must be a member of the bookable-slots set.
    pub time: NaiveTime,
    /// Free-text notes, sanitized and length-bounded before persisting.
    #[serde(default)]
    pub notes: String,
}

/// Strip control characters, collapse runs of whitespace and truncate on a
/// character boundary.
pub fn sanitize_notes(raw: &str, max_len: usize) -> String {
    let mut cleaned = String::with_capacity(raw.len().min(max_len));
    let mut pending_space = false;
    for ch in raw.chars() {
        if ch.is_control() {
            continue;
        }
        if ch.is_whitespace() {
            pending_space = !cleaned.is_empty();
            continue;
        }
        if pending_space {
            cleaned.push(' ');
            pending_space = false;
        }
        cleaned.push(ch);
    }
    if cleaned.chars().count() > max_len {
        cleaned = cleaned.chars().take(max_len).collect();
        // Truncation may cut right after a separator space.
        while cleaned.ends_with(' ') {
            cleaned.pop();
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notes_are_trimmed_collapsed_and_bounded() {
        assert_eq!(sanitize_notes("  hello   world  ", 100), "hello world");
        assert_eq!(sanitize_notes("tab\tand\nnewline", 100), "tab and newline");
        assert_eq!(sanitize_notes("ctrl\u{0007}char", 100), "ctrlchar");
        assert_eq!(sanitize_notes("abcdef", 3), "abc");
        assert_eq!(sanitize_notes("a bcd", 2), "a");
        assert_eq!(sanitize_notes("", 100), "");
    }

    #[test]
    fn truncation_respects_character_boundaries() {
        // Multi-byte characters must not be split.
        assert_eq!(sanitize_notes("áéíóú", 3), "áéí");
    }
}
