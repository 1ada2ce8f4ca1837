// --- File: crates/citaflow_scheduling/src/lifecycle.rs ---
//! Appointment lifecycle: the PENDING -> CANCELLED | ATTENDED state machine.
//!
//! Transitions are monotonic; a resolved appointment never returns to
//! PENDING. The pure transition checks live here so they are testable
//! without a store; the engine re-runs them at execution time.

use crate::models::{Appointment, AppointmentStatus};
use crate::store::StoreError;
use chrono::NaiveDateTime;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CancelError {
    #[error("appointment {0} does not exist")]
    NotFound(Uuid),
    #[error("the appointment does not belong to the requesting client")]
    NotOwner,
    #[error("the appointment is already {0}, only pending appointments can be cancelled")]
    AlreadyResolved(AppointmentStatus),
    #[error("the cancellation deadline has passed")]
    DeadlinePassed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug)]
pub enum AttendError {
    #[error("appointment {0} does not exist")]
    NotFound(Uuid),
    #[error("the appointment is already {0}, only pending appointments can be attended")]
    AlreadyResolved(AppointmentStatus),
    #[error("the attendance code does not match")]
    CodeMismatch,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Validate a cancellation without performing it.
///
/// Checked in order (ownership, then state, then deadline) so the caller
/// gets the most specific reason.
pub fn check_cancel(
    appointment: &Appointment,
    client_id: Uuid,
    now_local: NaiveDateTime,
) -> Result<(), CancelError> {
    if !appointment.is_active {
        return Err(CancelError::NotFound(appointment.id));
    }
    if appointment.client_id != client_id {
        return Err(CancelError::NotOwner);
    }
    if appointment.status != AppointmentStatus::Pending {
        return Err(CancelError::AlreadyResolved(appointment.status));
    }
    if now_local >= appointment.cancel_before {
        return Err(CancelError::DeadlinePassed);
    }
    Ok(())
}

/// Validate an attendance confirmation without performing it.
pub fn check_attend(appointment: &Appointment, code: &str) -> Result<(), AttendError> {
    if !appointment.is_active {
        return Err(AttendError::NotFound(appointment.id));
    }
    if appointment.status != AppointmentStatus::Pending {
        return Err(AttendError::AlreadyResolved(appointment.status));
    }
    if appointment.attendance_code != code {
        return Err(AttendError::CodeMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn pending_appointment(client_id: Uuid) -> Appointment {
        let start = NaiveDate::from_ymd_opt(2026, 9, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Appointment {
            id: Uuid::new_v4(),
            client_id,
            service_id: Uuid::new_v4(),
            office_id: Uuid::new_v4(),
            start,
            end: start + chrono::Duration::minutes(30),
            notes: String::new(),
            status: AppointmentStatus::Pending,
            attended: false,
            attendance_code: "123456".to_string(),
            cancel_before: start - chrono::Duration::hours(24),
            created_at: Utc::now(),
            is_active: true,
        }
    }

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 9, 10)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn owner_can_cancel_before_the_deadline() {
        let client = Uuid::new_v4();
        let appointment = pending_appointment(client);
        assert!(check_cancel(&appointment, client, at(9)).is_ok());
        assert!(appointment.can_still_cancel(at(9)));
    }

    #[test]
    fn non_owner_is_rejected() {
        let appointment = pending_appointment(Uuid::new_v4());
        assert!(matches!(
            check_cancel(&appointment, Uuid::new_v4(), at(9)),
            Err(CancelError::NotOwner)
        ));
    }

    #[test]
    fn cancel_at_or_after_the_deadline_is_rejected() {
        let client = Uuid::new_v4();
        let appointment = pending_appointment(client);
        // Exactly at the deadline counts as passed: "now" must be strictly
        // before cancel_before.
        assert!(matches!(
            check_cancel(&appointment, client, appointment.cancel_before),
            Err(CancelError::DeadlinePassed)
        ));
        assert!(!appointment.can_still_cancel(appointment.cancel_before));
    }

    #[test]
    fn resolved_appointments_cannot_transition_again() {
        let client = Uuid::new_v4();
        let mut appointment = pending_appointment(client);
        appointment.status = AppointmentStatus::Cancelled;
        assert!(matches!(
            check_cancel(&appointment, client, at(9)),
            Err(CancelError::AlreadyResolved(AppointmentStatus::Cancelled))
        ));
        assert!(matches!(
            check_attend(&appointment, "123456"),
            Err(AttendError::AlreadyResolved(AppointmentStatus::Cancelled))
        ));
    }

    #[test]
    fn attend_requires_the_matching_code() {
        let appointment = pending_appointment(Uuid::new_v4());
        assert!(check_attend(&appointment, "123456").is_ok());
        assert!(matches!(
            check_attend(&appointment, "000000"),
            Err(AttendError::CodeMismatch)
        ));
    }
}
