// --- File: crates/citaflow_scheduling/src/store/memory.rs ---
//! In-memory scheduling store.
//!
//! Backs unit/integration tests and database-less local runs. Booking-window
//! serialization uses one `tokio::sync::Mutex` per (office, date) key, which
//! is exactly the advisory-lock discipline the SQL store implements.

use super::{BookingLock, NewAppointment, SchedulingStore, StoreError};
use crate::models::{
    Appointment, AppointmentStatus, BlockedHour, Client, Holiday, Office, OfficeService, Service,
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    offices: Vec<Office>,
    services: Vec<Service>,
    office_services: Vec<OfficeService>,
    blocked_hours: Vec<BlockedHour>,
    holidays: Vec<Holiday>,
    clients: Vec<Client>,
    appointments: Vec<Appointment>,
}

/// In-memory implementation of [`SchedulingStore`].
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    booking_locks: Arc<Mutex<HashMap<(Uuid, NaiveDate), Arc<tokio::sync::Mutex<()>>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Seeding helpers for tests and local development.

    pub fn add_office(&self, office: Office) {
        self.tables.lock().expect("store poisoned").offices.push(office);
    }

    pub fn add_service(&self, service: Service) {
        self.tables.lock().expect("store poisoned").services.push(service);
    }

    pub fn add_office_service(&self, link: OfficeService) {
        self.tables
            .lock()
            .expect("store poisoned")
            .office_services
            .push(link);
    }

    pub fn add_blocked_hour(&self, blocked: BlockedHour) {
        self.tables
            .lock()
            .expect("store poisoned")
            .blocked_hours
            .push(blocked);
    }

    pub fn add_holiday(&self, holiday: Holiday) {
        self.tables.lock().expect("store poisoned").holidays.push(holiday);
    }

    pub fn add_client(&self, client: Client) {
        self.tables.lock().expect("store poisoned").clients.push(client);
    }

    fn lock_for(&self, office_id: Uuid, date: NaiveDate) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.booking_locks.lock().expect("lock map poisoned");
        locks
            .entry((office_id, date))
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}

#[async_trait]
impl SchedulingStore for InMemoryStore {
    async fn find_office_by_code(&self, code: &str) -> Result<Option<Office>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.offices.iter().find(|o| o.code == code).cloned())
    }

    async fn find_service_by_code(&self, code: &str) -> Result<Option<Service>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.services.iter().find(|s| s.code == code).cloned())
    }

    async fn find_office_service(
        &self,
        office_id: Uuid,
        service_id: Uuid,
    ) -> Result<Option<OfficeService>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables
            .office_services
            .iter()
            .find(|l| l.office_id == office_id && l.service_id == service_id)
            .cloned())
    }

    async fn find_client(&self, client_id: Uuid) -> Result<Option<Client>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.clients.iter().find(|c| c.id == client_id).cloned())
    }

    async fn list_holidays(&self) -> Result<Vec<NaiveDate>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut dates: Vec<NaiveDate> = tables
            .holidays
            .iter()
            .filter(|h| h.is_active)
            .map(|h| h.date)
            .collect();
        dates.sort_unstable();
        Ok(dates)
    }

    async fn list_blocked_hours(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<BlockedHour>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables
            .blocked_hours
            .iter()
            .filter(|b| b.office_id == office_id && b.date == date)
            .cloned()
            .collect())
    }

    async fn count_office_occupancy(
        &self,
        office_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<u32, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables
            .appointments
            .iter()
            .filter(|a| {
                a.office_id == office_id
                    && a.is_active
                    && a.status != AppointmentStatus::Cancelled
                    && overlaps(a.start, a.end, start, end)
            })
            .count() as u32)
    }

    async fn count_client_pending(&self, client_id: Uuid) -> Result<u32, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables
            .appointments
            .iter()
            .filter(|a| {
                a.client_id == client_id
                    && a.is_active
                    && a.status == AppointmentStatus::Pending
            })
            .count() as u32)
    }

    async fn client_has_pending_overlap(
        &self,
        client_id: Uuid,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<bool, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.appointments.iter().any(|a| {
            a.client_id == client_id
                && a.is_active
                && a.status == AppointmentStatus::Pending
                && overlaps(a.start, a.end, start, end)
        }))
    }

    async fn lock_booking_window(
        &self,
        office_id: Uuid,
        date: NaiveDate,
    ) -> Result<BookingLock, StoreError> {
        let window = self.lock_for(office_id, date);
        let guard = window.lock_owned().await;
        Ok(BookingLock::new(guard))
    }

    async fn insert_appointment(&self, new: NewAppointment) -> Result<Appointment, StoreError> {
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: new.client_id,
            service_id: new.service_id,
            office_id: new.office_id,
            start: new.start,
            end: new.end,
            notes: new.notes,
            status: AppointmentStatus::Pending,
            attended: false,
            attendance_code: new.attendance_code,
            cancel_before: new.cancel_before,
            created_at: Utc::now(),
            is_active: true,
        };
        let mut tables = self.tables.lock().expect("store poisoned");
        tables.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn find_appointment(&self, id: Uuid) -> Result<Option<Appointment>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        Ok(tables.appointments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_client_pending(&self, client_id: Uuid) -> Result<Vec<Appointment>, StoreError> {
        let tables = self.tables.lock().expect("store poisoned");
        let mut pending: Vec<Appointment> = tables
            .appointments
            .iter()
            .filter(|a| {
                a.client_id == client_id
                    && a.is_active
                    && a.status == AppointmentStatus::Pending
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(pending)
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
        attended: bool,
    ) -> Result<Appointment, StoreError> {
        let mut tables = self.tables.lock().expect("store poisoned");
        let appointment = tables
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::Backend(format!("appointment {id} vanished")))?;
        appointment.status = status;
        appointment.attended = attended;
        Ok(appointment.clone())
    }
}
