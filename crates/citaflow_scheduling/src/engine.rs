// --- File: crates/citaflow_scheduling/src/engine.rs ---
//! The scheduling engine: the single entry point for availability queries,
//! bookings and lifecycle transitions.
//!
//! The engine holds no request state; everything shared lives behind the
//! store. Collaborators (store, clock, notifier) are injected, so the whole
//! engine runs against the in-memory store and a fixed clock in tests.

use crate::availability::{slot_is_blocked, AvailableDays, SlotGrid};
use crate::booking::{sanitize_notes, BookingError, BookingRequest, EntityKind};
use crate::calendar::shift_to_prior_business_day;
use crate::clock::Clock;
use crate::codes::generate_attendance_code;
use crate::ledger::CapacityLedger;
use crate::lifecycle::{check_attend, check_cancel, AttendError, CancelError};
use crate::models::{Appointment, AppointmentStatus, Client, Office, Service};
use crate::store::{NewAppointment, SchedulingStore, StoreError};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use citaflow_common::services::{BoxedError, NotificationEvent, NotificationService};
use citaflow_common::{config_error, CitaflowError};
use citaflow_config::SchedulingConfig;
use serde_json::json;
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Parsed, validated scheduling settings. Built once at startup; a malformed
/// timezone or window string fails here, not per request.
#[derive(Debug, Clone)]
pub struct SchedulingSettings {
    pub time_zone: Tz,
    pub horizon_days: u32,
    pub default_pending_limit: u32,
    pub default_open_time: NaiveTime,
    pub default_close_time: NaiveTime,
    pub cancel_lead: Duration,
    pub attendance_code_length: usize,
    pub notes_max_len: usize,
}

impl SchedulingSettings {
    pub fn from_config(config: &SchedulingConfig) -> Result<Self, CitaflowError> {
        let time_zone = Tz::from_str(&config.time_zone)
            .map_err(|_| config_error(format!("unknown timezone {:?}", config.time_zone)))?;
        let default_open_time = parse_window_time(&config.default_open_time)?;
        let default_close_time = parse_window_time(&config.default_close_time)?;
        if default_open_time >= default_close_time {
            return Err(config_error(format!(
                "default office window is empty: {} .. {}",
                config.default_open_time, config.default_close_time
            )));
        }
        Ok(Self {
            time_zone,
            horizon_days: config.horizon_days,
            default_pending_limit: config.default_pending_limit,
            default_open_time,
            default_close_time,
            cancel_lead: Duration::hours(i64::from(config.cancel_lead_hours)),
            attendance_code_length: config.attendance_code_length,
            notes_max_len: config.notes_max_len,
        })
    }
}

fn parse_window_time(raw: &str) -> Result<NaiveTime, CitaflowError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| config_error(format!("invalid HH:MM time {raw:?}")))
}

/// Failure modes of owner-scoped appointment lookups.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("appointment {0} does not exist")]
    NotFound(Uuid),
    #[error("the appointment does not belong to the requesting client")]
    NotOwner,
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct SchedulingEngine {
    store: Arc<dyn SchedulingStore>,
    ledger: CapacityLedger,
    clock: Arc<dyn Clock>,
    notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
    settings: SchedulingSettings,
}

impl SchedulingEngine {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        clock: Arc<dyn Clock>,
        notifier: Option<Arc<dyn NotificationService<Error = BoxedError>>>,
        settings: SchedulingSettings,
    ) -> Self {
        let ledger = CapacityLedger::new(store.clone());
        Self {
            store,
            ledger,
            clock,
            notifier,
            settings,
        }
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn SchedulingStore> {
        &self.store
    }

    /// Wall-clock "now" in the business timezone.
    fn now_local(&self) -> NaiveDateTime {
        self.clock
            .now_utc()
            .with_timezone(&self.settings.time_zone)
            .naive_local()
    }

    async fn resolve_office(&self, code: &str) -> Result<Office, BookingError> {
        let office = self
            .store
            .find_office_by_code(code)
            .await?
            .ok_or_else(|| BookingError::NotFound {
                kind: EntityKind::Office,
                code: code.to_string(),
            })?;
        if !office.is_active {
            return Err(BookingError::Inactive {
                kind: EntityKind::Office,
                code: code.to_string(),
            });
        }
        Ok(office)
    }

    async fn resolve_service(&self, code: &str) -> Result<Service, BookingError> {
        let service = self
            .store
            .find_service_by_code(code)
            .await?
            .ok_or_else(|| BookingError::NotFound {
                kind: EntityKind::Service,
                code: code.to_string(),
            })?;
        if !service.is_active {
            return Err(BookingError::Inactive {
                kind: EntityKind::Service,
                code: code.to_string(),
            });
        }
        Ok(service)
    }

    async fn resolve_pair(
        &self,
        office_code: &str,
        service_code: &str,
    ) -> Result<(Office, Service), BookingError> {
        let office = self.resolve_office(office_code).await?;
        let service = self.resolve_service(service_code).await?;
        let link = self
            .store
            .find_office_service(office.id, service.id)
            .await?;
        match link {
            Some(link) if link.is_active => Ok((office, service)),
            _ => Err(BookingError::NotOffered),
        }
    }

    fn slot_grid_for(&self, service: &Service) -> Result<SlotGrid, BookingError> {
        let open = service.open_time.unwrap_or(self.settings.default_open_time);
        let close = service
            .close_time
            .unwrap_or(self.settings.default_close_time);
        Ok(SlotGrid::new(
            open,
            close,
            i64::from(service.duration_minutes),
        )?)
    }

    fn available_days_for(
        &self,
        service: &Service,
        holidays: HashSet<NaiveDate>,
    ) -> AvailableDays {
        AvailableDays::new(
            self.now_local().date(),
            self.settings.horizon_days,
            service.weekdays,
            holidays,
        )
    }

    /// Ordered bookable days for an (office, service) pair over the horizon.
    pub async fn list_available_days(
        &self,
        office_code: &str,
        service_code: &str,
    ) -> Result<Vec<NaiveDate>, BookingError> {
        let (_office, service) = self.resolve_pair(office_code, service_code).await?;
        let holidays: HashSet<NaiveDate> = self.store.list_holidays().await?.into_iter().collect();
        Ok(self.available_days_for(&service, holidays).collect())
    }

    /// Candidate slots for a date, minus blocked hours and already-passed
    /// starts. Capacity is deliberately not consulted here; the public slot
    /// listing layers it on and the booking transaction checks it under the
    /// booking lock.
    async fn offered_slots(
        &self,
        office: &Office,
        service: &Service,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let grid = self.slot_grid_for(service)?;
        let blocked = self.store.list_blocked_hours(office.id, date).await?;
        let now_local = self.now_local();
        let is_today = date == now_local.date();
        let duration = grid.duration();
        Ok(grid
            .starts()
            .filter(|start| !slot_is_blocked(*start, *start + duration, &blocked))
            .filter(|start| !is_today || *start > now_local.time())
            .collect())
    }

    /// Ordered bookable slot start times for an (office, service, date).
    ///
    /// Internally consistent with [`Self::list_available_days`]: a date that
    /// listing excludes yields an empty slot list.
    pub async fn list_available_slots(
        &self,
        office_code: &str,
        service_code: &str,
        date: NaiveDate,
    ) -> Result<Vec<NaiveTime>, BookingError> {
        let (office, service) = self.resolve_pair(office_code, service_code).await?;
        let holidays: HashSet<NaiveDate> = self.store.list_holidays().await?.into_iter().collect();
        if !self
            .available_days_for(&service, holidays)
            .any(|day| day == date)
        {
            return Ok(Vec::new());
        }
        let offered = self.offered_slots(&office, &service, date).await?;
        let duration = Duration::minutes(i64::from(service.duration_minutes));
        let mut open = Vec::with_capacity(offered.len());
        for start in offered {
            let start_dt = date.and_time(start);
            let occupancy = self
                .ledger
                .office_occupancy(office.id, start_dt, start_dt + duration)
                .await?;
            if occupancy < office.capacity {
                open.push(start);
            }
        }
        Ok(open)
    }

    /// The booking transaction: validates every invariant in order and
    /// persists the appointment, or returns the first declared failure with
    /// no partial write.
    pub async fn book(
        &self,
        client: &Client,
        request: BookingRequest,
    ) -> Result<Appointment, BookingError> {
        // Steps 1-3: resolve office, service and their active join row.
        let (office, service) = self
            .resolve_pair(&request.office_code, &request.service_code)
            .await?;

        // Step 4: the date must be a member of the bookable-days set.
        let holidays: HashSet<NaiveDate> = self.store.list_holidays().await?.into_iter().collect();
        if !self
            .available_days_for(&service, holidays.clone())
            .any(|day| day == request.date)
        {
            return Err(BookingError::InvalidDate);
        }

        // Step 5: the slot must be on the offered grid for that day.
        let offered = self.offered_slots(&office, &service, request.date).await?;
        if !offered.contains(&request.time) {
            return Err(BookingError::InvalidSlot);
        }

        // Step 6: appointment interval.
        let start = request.date.and_time(request.time);
        let end = start + Duration::minutes(i64::from(service.duration_minutes));

        // Steps 7-12 run while holding the per-(office, date) booking lock;
        // two concurrent bookings for the same window serialize here.
        let _lock = self
            .store
            .lock_booking_window(office.id, request.date)
            .await?;

        // Step 7: office capacity.
        let occupancy = self.ledger.office_occupancy(office.id, start, end).await?;
        if occupancy >= office.capacity {
            return Err(BookingError::OfficeFull);
        }

        // Step 8: client pending-load limit.
        let limit =
            CapacityLedger::effective_pending_limit(client, self.settings.default_pending_limit);
        let pending = self.ledger.client_pending(client.id).await?;
        if pending >= limit {
            return Err(BookingError::ClientLimitReached);
        }

        // Step 9: no conflicting pending appointment for the client.
        if self
            .store
            .client_has_pending_overlap(client.id, start, end)
            .await?
        {
            return Err(BookingError::ClientConflict);
        }

        // Step 10: cancellation deadline, shifted to a business day.
        let cancel_before =
            shift_to_prior_business_day(start - self.settings.cancel_lead, &holidays)?;

        // Steps 11-12: attendance code and the persisted appointment.
        let attendance_code = generate_attendance_code(self.settings.attendance_code_length);
        let appointment = self
            .store
            .insert_appointment(NewAppointment {
                client_id: client.id,
                service_id: service.id,
                office_id: office.id,
                start,
                end,
                notes: sanitize_notes(&request.notes, self.settings.notes_max_len),
                attendance_code,
                cancel_before,
            })
            .await?;
        drop(_lock);

        info!(
            appointment_id = %appointment.id,
            office = %office.code,
            service = %service.code,
            start = %appointment.start,
            "appointment booked"
        );

        // Step 13: fire-and-forget confirmation; failure never unwinds the
        // booking.
        self.dispatch_notification(
            client.id,
            NotificationEvent::AppointmentCreated,
            json!({
                "appointment_id": appointment.id,
                "office": office.code,
                "service": service.code,
                "start": appointment.start,
                "attendance_code": appointment.attendance_code,
            }),
        );

        Ok(appointment)
    }

    /// Cancel a pending appointment. Owner-only, deadline re-validated at
    /// execution time.
    pub async fn cancel(
        &self,
        client: &Client,
        appointment_id: Uuid,
    ) -> Result<Appointment, CancelError> {
        let appointment = self
            .store
            .find_appointment(appointment_id)
            .await?
            .ok_or(CancelError::NotFound(appointment_id))?;
        check_cancel(&appointment, client.id, self.now_local())?;
        let cancelled = self
            .store
            .update_appointment_status(appointment.id, AppointmentStatus::Cancelled, false)
            .await?;

        info!(appointment_id = %cancelled.id, "appointment cancelled");
        self.dispatch_notification(
            client.id,
            NotificationEvent::AppointmentCancelled,
            json!({
                "appointment_id": cancelled.id,
                "start": cancelled.start,
            }),
        );
        Ok(cancelled)
    }

    /// Confirm in-person attendance, consuming the attendance code. Driven by
    /// the front-desk flow, not by the owning client.
    pub async fn mark_attended(
        &self,
        appointment_id: Uuid,
        code: &str,
    ) -> Result<Appointment, AttendError> {
        let appointment = self
            .store
            .find_appointment(appointment_id)
            .await?
            .ok_or(AttendError::NotFound(appointment_id))?;
        check_attend(&appointment, code)?;
        let attended = self
            .store
            .update_appointment_status(appointment.id, AppointmentStatus::Attended, true)
            .await?;
        info!(appointment_id = %attended.id, "appointment attended");
        Ok(attended)
    }

    /// Derived read-only property for callers: whether the appointment can
    /// still be cancelled at this instant. [`Self::cancel`] re-validates it
    /// at execution time.
    pub fn can_still_cancel(&self, appointment: &Appointment) -> bool {
        appointment.can_still_cancel(self.now_local())
    }

    /// How many more appointments the client may book right now.
    pub async fn count_remaining_bookable(&self, client: &Client) -> Result<u32, StoreError> {
        self.ledger
            .remaining_bookable(client, self.settings.default_pending_limit)
            .await
    }

    /// Fetch one appointment; it must belong to the requesting client.
    pub async fn find_client_appointment(
        &self,
        client: &Client,
        appointment_id: Uuid,
    ) -> Result<Appointment, LookupError> {
        let appointment = self
            .store
            .find_appointment(appointment_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or(LookupError::NotFound(appointment_id))?;
        if appointment.client_id != client.id {
            return Err(LookupError::NotOwner);
        }
        Ok(appointment)
    }

    /// The client's own pending appointments, newest first.
    pub async fn list_client_pending(
        &self,
        client: &Client,
    ) -> Result<Vec<Appointment>, StoreError> {
        self.store.list_client_pending(client.id).await
    }

    fn dispatch_notification(
        &self,
        client_id: Uuid,
        event: NotificationEvent,
        payload: serde_json::Value,
    ) {
        let Some(notifier) = self.notifier.clone() else {
            debug!("no notification service configured, skipping dispatch");
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = notifier.notify(client_id, event, payload).await {
                warn!("notification dispatch failed: {err}");
            }
        });
    }
}
