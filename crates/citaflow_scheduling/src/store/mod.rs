// --- File: crates/citaflow_scheduling/src/store/mod.rs ---
//! Persistence abstraction for the scheduling engine.
//!
//! The engine only ever sees this trait; `citaflow_db` provides the SQL
//! implementation and [`memory::InMemoryStore`] backs tests and local
//! development.

use crate::models::{
    Appointment, AppointmentStatus, BlockedHour, Client, Office, OfficeService, Service,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::any::Any;
use thiserror::Error;
use uuid::Uuid;

pub mod memory;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("storage connection error: {0}")]
    Connection(String),
}

/// Fields the booking transaction supplies when persisting a new appointment.
/// Identifier, creation timestamp and soft-delete flag are the store's job.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub office_id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: String,
    pub attendance_code: String,
    pub cancel_before: NaiveDateTime,
}

/// Opaque guard serializing bookings per (office, date). Holding it
/// guarantees no other booking for the same window can run its
/// check-and-insert concurrently; the lock is released on drop.
pub struct BookingLock {
    // Box<dyn Any> lets each store carry its own guard type (an owned mutex
    // guard for the in-memory store, an advisory-lock holder for SQL).
    _guard: Box<dyn Any + Send>,
}

impl BookingLock {
    pub fn new(guard: impl Any + Send) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

/// Transactional read/write access to the scheduling entities.
///
/// All read methods exclude soft-deleted rows. Occupancy and pending counts
/// are only meaningful while the caller holds the corresponding
/// [`BookingLock`]; see `lock_booking_window`.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    async fn find_office_by_code(&self, code: &str) -> Result<Option<Office>, StoreError>;

    async fn find_service_by_code(&self, code: &str) -> Result<Option<Service>, StoreError>;

    async fn find_office_service(
        &self,
        office_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<OfficeService>, StoreError>;

    async fn find_client(&self, client_id: Uuid) -> Result<Option<Client>, StoreError>;

    /// Active holidays, ascending.
    async fn list_holidays(&self) -> Result<Vec<NaiveDate>, StoreError>;

    /// Blocked-hour ranges for one office on one date.
    async fn list_blocked_hours(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BlockedHour>, StoreError>;

    /// Count of active, non-cancelled appointments at an office whose
    /// [start, end) interval intersects the given one.
    async fn count_office_occupancy(
        &self,
        office_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u32, StoreError>;

    /// Count of a client's active PENDING appointments.
    async fn count_client_pending(&self, client_id: Uuid) -> Result<u32, StoreError>;

    /// Whether the client has an active PENDING appointment intersecting
    /// [start, end).
    async fn client_has_pending_overlap(
        &self,
        client_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool, StoreError>;

    /// Serialize bookings for one office on one date. Held across the
    /// capacity checks and the insert; released on drop.
    async fn lock_booking_window(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<BookingLock, StoreError>;

    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError>;

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError>;

    /// Client's active PENDING appointments, newest first.
    async fn list_client_pending(&self, client_id: Uuid) -> Result<Vec<Appointment>, StoreError>;

    /// Persist a status transition. `attended` is set alongside the ATTENDED
    /// status; no other field may change after creation.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        attended: bool,
    ) -> Result<Appointment, StoreError>;
}
