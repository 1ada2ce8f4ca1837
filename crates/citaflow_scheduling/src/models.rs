// --- File: crates/citaflow_scheduling/src/models.rs ---
//! Domain model for the scheduling engine.
//!
//! Relations are expressed as foreign-key identifiers plus repository
//! lookups, never embedded object graphs. Appointment timestamps are
//! wall-clock values in the configured business timezone.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A physical location offering services, with a concurrent-appointment capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Office {
    pub id: Uuid,
    /// Unique short code, e.g. "OF1".
    pub code: String,
    pub description: String,
    /// Maximum number of simultaneous appointments at this office.
    pub capacity: u32,
    pub is_active: bool,
}

/// A bookable offering with fixed duration and weekday/time-window eligibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    /// Unique short code, e.g. "SV1".
    pub code: String,
    pub description: String,
    /// Appointment duration in whole minutes.
    pub duration_minutes: u32,
    /// Daily opening time override; falls back to the system default window.
    pub open_time: Option<NaiveTime>,
    /// Daily closing time override; falls back to the system default window.
    pub close_time: Option<NaiveTime>,
    /// Which weekdays the service is offered.
    pub weekdays: WeekdayMask,
    /// Maximum number of documents a client may bring.
    pub document_limit: u32,
    pub is_active: bool,
}

/// Join entity: which services an office offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfficeService {
    pub id: Uuid,
    pub office_id: Uuid,
    pub service_id: Uuid,
    pub is_active: bool,
}

/// A time range during which no slot may be offered at an office.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedHour {
    pub id: Uuid,
    pub office_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// A calendar date flagged as a non-business day, independent of weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    pub id: Uuid,
    pub date: NaiveDate,
    pub is_active: bool,
}

/// A registered citizen who can book appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Per-client pending-appointment limit. Only honoured when it raises the
    /// system default, never when it lowers it.
    pub pending_limit: u32,
    pub is_active: bool,
}

/// Status of an appointment. PENDING is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Cancelled,
    Attended,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::Attended => "ATTENDED",
        }
    }

    /// A terminal appointment can never change status again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, AppointmentStatus::Pending)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(AppointmentStatus::Pending),
            "CANCELLED" => Ok(AppointmentStatus::Cancelled),
            "ATTENDED" => Ok(AppointmentStatus::Attended),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// A booked appointment. Created only by the booking transaction; mutated
/// only through cancel/attend transitions. Never physically deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub office_id: Uuid,
    /// Wall-clock start in the business timezone.
    pub start: NaiveDateTime,
    /// Wall-clock end; always start + service duration.
    pub end: NaiveDateTime,
    pub notes: String,
    pub status: AppointmentStatus,
    pub attended: bool,
    /// Short numeric code handed to the client, consumed at the front desk.
    pub attendance_code: String,
    /// Latest wall-clock instant at which the client may still cancel.
    pub cancel_before: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl Appointment {
    /// Derived read-only property for UI decisions. The cancel operation
    /// re-validates this at execution time.
    pub fn can_still_cancel(&self, now_local: NaiveDateTime) -> bool {
        self.status == AppointmentStatus::Pending && now_local < self.cancel_before
    }
}

/// Seven weekday flags, Monday first, parsed from a mask like `"1111100"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekdayMask([bool; 7]);

impl WeekdayMask {
    /// Monday through Friday.
    pub fn business_week() -> Self {
        WeekdayMask([true, true, true, true, true, false, false])
    }

    /// All seven days.
    pub fn every_day() -> Self {
        WeekdayMask([true; 7])
    }

    pub fn allows(&self, weekday: Weekday) -> bool {
        self.0[weekday.num_days_from_monday() as usize]
    }
}

impl FromStr for WeekdayMask {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 7 {
            return Err(format!("weekday mask must be 7 characters, got {:?}", s));
        }
        let mut days = [false; 7];
        for (i, ch) in s.chars().enumerate() {
            days[i] = match ch {
                '1' => true,
                '0' => false,
                other => return Err(format!("weekday mask accepts only 0/1, got {other:?}")),
            };
        }
        Ok(WeekdayMask(days))
    }
}

impl TryFrom<String> for WeekdayMask {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekdayMask> for String {
    fn from(mask: WeekdayMask) -> Self {
        mask.0.iter().map(|d| if *d { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for WeekdayMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekday_mask_parses_and_round_trips() {
        let mask: WeekdayMask = "1111100".parse().unwrap();
        assert!(mask.allows(Weekday::Mon));
        assert!(mask.allows(Weekday::Fri));
        assert!(!mask.allows(Weekday::Sat));
        assert!(!mask.allows(Weekday::Sun));
        assert_eq!(String::from(mask), "1111100");
    }

    #[test]
    fn weekday_mask_rejects_malformed_input() {
        assert!("11111".parse::<WeekdayMask>().is_err());
        assert!("11111x0".parse::<WeekdayMask>().is_err());
    }

    #[test]
    fn status_round_trips_through_canonical_strings() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Attended,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
        }
        assert!("CANCELO".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn terminal_states_are_terminal() {
        assert!(!AppointmentStatus::Pending.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::Attended.is_terminal());
    }
}
