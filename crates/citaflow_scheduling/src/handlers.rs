// --- File: crates/citaflow_scheduling/src/handlers.rs ---
//! Axum handlers for the scheduling API.
//!
//! Thin plumbing: resolve the caller's identity, call the engine, map the
//! structured outcome to a status code and JSON body. No scheduling decision
//! is made here.

use crate::booking::{BookingError, BookingRequest};
use crate::engine::{LookupError, SchedulingEngine};
use crate::lifecycle::{AttendError, CancelError};
use crate::models::{Appointment, AppointmentStatus, Client};
use crate::store::StoreError;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

/// Header carrying the already-authenticated client identity. Token
/// validation happens upstream; this layer only resolves and gates on the
/// client row.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

// Shared state for the scheduling routes.
#[derive(Clone)]
pub struct SchedulingState {
    pub engine: Arc<SchedulingEngine>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct AvailableDaysQuery {
    /// Office short code, e.g. "OF1"
    pub office_code: String,
    /// Service short code, e.g. "SV1"
    pub service_code: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableDaysResponse {
    pub days: Vec<NaiveDate>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct AvailableSlotsQuery {
    pub office_code: String,
    pub service_code: String,
    /// Target day in YYYY-MM-DD format
    pub date: NaiveDate,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailableSlotsResponse {
    /// Slot start times, "HH:MM", ascending
    pub slots: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttendRequest {
    /// The attendance code handed out at booking time
    pub code: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RemainingResponse {
    pub remaining: u32,
}

/// API representation of an appointment.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentOut {
    pub id: Uuid,
    pub office_id: Uuid,
    pub service_id: Uuid,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub notes: String,
    pub status: AppointmentStatus,
    pub attended: bool,
    pub attendance_code: String,
    pub cancel_before: NaiveDateTime,
    pub created_at: DateTime<Utc>,
    /// Whether the owner can still cancel at the time of the response
    pub can_still_cancel: bool,
}

impl AppointmentOut {
    fn from_appointment(engine: &SchedulingEngine, appointment: Appointment) -> Self {
        let can_still_cancel = engine.can_still_cancel(&appointment);
        Self {
            id: appointment.id,
            office_id: appointment.office_id,
            service_id: appointment.service_id,
            start: appointment.start,
            end: appointment.end,
            notes: appointment.notes,
            status: appointment.status,
            attended: appointment.attended,
            attendance_code: appointment.attendance_code,
            cancel_before: appointment.cancel_before,
            created_at: appointment.created_at,
            can_still_cancel,
        }
    }
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentOut>,
}

type Rejection = (StatusCode, String);

/// Resolve the caller to an active client, or reject the request.
async fn require_client(
    state: &SchedulingState,
    headers: &HeaderMap,
) -> Result<Client, Rejection> {
    let raw = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or((
            StatusCode::UNAUTHORIZED,
            "Missing client identity".to_string(),
        ))?;
    let client_id = Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::UNAUTHORIZED,
            "Invalid client identity".to_string(),
        )
    })?;
    let client = state
        .engine
        .store()
        .find_client(client_id)
        .await
        .map_err(store_error_rejection)?
        .ok_or((StatusCode::UNAUTHORIZED, "Unknown client".to_string()))?;
    if !client.is_active {
        return Err((StatusCode::UNAUTHORIZED, "Client is not active".to_string()));
    }
    Ok(client)
}

fn store_error_rejection(err: StoreError) -> Rejection {
    error!("storage failure: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Storage unavailable".to_string(),
    )
}

fn booking_error_rejection(err: BookingError) -> Rejection {
    let status = match &err {
        BookingError::NotFound { .. } => StatusCode::NOT_FOUND,
        BookingError::Inactive { .. } | BookingError::NotOffered => StatusCode::CONFLICT,
        BookingError::InvalidDate | BookingError::InvalidSlot => StatusCode::UNPROCESSABLE_ENTITY,
        BookingError::OfficeFull
        | BookingError::ClientLimitReached
        | BookingError::ClientConflict => StatusCode::CONFLICT,
        BookingError::Calendar(_) | BookingError::Availability(_) | BookingError::Store(_) => {
            error!("booking failed server-side: {err}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            );
        }
    };
    (status, err.to_string())
}

fn cancel_error_rejection(err: CancelError) -> Rejection {
    match &err {
        CancelError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        CancelError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
        CancelError::AlreadyResolved(_) | CancelError::DeadlinePassed => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CancelError::Store(inner) => {
            error!("cancel failed server-side: {inner}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

fn attend_error_rejection(err: AttendError) -> Rejection {
    match &err {
        AttendError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        AttendError::AlreadyResolved(_) => (StatusCode::CONFLICT, err.to_string()),
        AttendError::CodeMismatch => (StatusCode::FORBIDDEN, err.to_string()),
        AttendError::Store(inner) => {
            error!("attend failed server-side: {inner}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

fn lookup_error_rejection(err: LookupError) -> Rejection {
    match &err {
        LookupError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        LookupError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
        LookupError::Store(inner) => {
            error!("lookup failed server-side: {inner}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            )
        }
    }
}

/// Handler to list bookable days for an office/service pair.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/citas/available-days",
    params(AvailableDaysQuery),
    responses(
        (status = 200, description = "Bookable days", body = AvailableDaysResponse),
        (status = 404, description = "Unknown office or service"),
        (status = 409, description = "Pair disabled or not offered")
    ),
    tag = "Citas"
))]
pub async fn available_days_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<AvailableDaysQuery>,
) -> Result<Json<AvailableDaysResponse>, Rejection> {
    let days = state
        .engine
        .list_available_days(&query.office_code, &query.service_code)
        .await
        .map_err(booking_error_rejection)?;
    Ok(Json(AvailableDaysResponse { days }))
}

/// Handler to list bookable slot start times for a specific day.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/citas/available-slots",
    params(AvailableSlotsQuery),
    responses(
        (status = 200, description = "Bookable slot start times", body = AvailableSlotsResponse),
        (status = 404, description = "Unknown office or service")
    ),
    tag = "Citas"
))]
pub async fn available_slots_handler(
    State(state): State<Arc<SchedulingState>>,
    Query(query): Query<AvailableSlotsQuery>,
) -> Result<Json<AvailableSlotsResponse>, Rejection> {
    let slots = state
        .engine
        .list_available_slots(&query.office_code, &query.service_code, query.date)
        .await
        .map_err(booking_error_rejection)?;
    Ok(Json(AvailableSlotsResponse {
        slots: slots.iter().map(|t| t.format("%H:%M").to_string()).collect(),
    }))
}

/// Handler to book an appointment for the authenticated client.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/citas/book",
    request_body = BookingRequest,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentOut),
        (status = 409, description = "Capacity, limit or conflict rejection"),
        (status = 422, description = "Date or slot outside availability")
    ),
    tag = "Citas"
))]
pub async fn book_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<AppointmentOut>), Rejection> {
    let client = require_client(&state, &headers).await?;
    let appointment = state
        .engine
        .book(&client, request)
        .await
        .map_err(booking_error_rejection)?;
    Ok((
        StatusCode::CREATED,
        Json(AppointmentOut::from_appointment(&state.engine, appointment)),
    ))
}

/// Handler to cancel one of the authenticated client's appointments.
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/citas/cancel/{appointment_id}",
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentOut),
        (status = 403, description = "Not the owner"),
        (status = 409, description = "Already resolved or past the deadline")
    ),
    tag = "Citas"
))]
pub async fn cancel_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentOut>, Rejection> {
    let client = require_client(&state, &headers).await?;
    let cancelled = state
        .engine
        .cancel(&client, appointment_id)
        .await
        .map_err(cancel_error_rejection)?;
    Ok(Json(AppointmentOut::from_appointment(
        &state.engine,
        cancelled,
    )))
}

/// Handler for the front-desk attendance confirmation.
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/citas/attend/{appointment_id}",
    request_body = AttendRequest,
    responses(
        (status = 200, description = "Attendance confirmed", body = AppointmentOut),
        (status = 403, description = "Attendance code mismatch"),
        (status = 409, description = "Already resolved")
    ),
    tag = "Citas"
))]
pub async fn attend_handler(
    State(state): State<Arc<SchedulingState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AttendRequest>,
) -> Result<Json<AppointmentOut>, Rejection> {
    let attended = state
        .engine
        .mark_attended(appointment_id, &request.code)
        .await
        .map_err(attend_error_rejection)?;
    Ok(Json(AppointmentOut::from_appointment(
        &state.engine,
        attended,
    )))
}

/// Handler returning how many more appointments the client may book.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/citas/remaining",
    responses(
        (status = 200, description = "Remaining bookable appointments", body = RemainingResponse)
    ),
    tag = "Citas"
))]
pub async fn remaining_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
) -> Result<Json<RemainingResponse>, Rejection> {
    let client = require_client(&state, &headers).await?;
    let remaining = state
        .engine
        .count_remaining_bookable(&client)
        .await
        .map_err(store_error_rejection)?;
    Ok(Json(RemainingResponse { remaining }))
}

/// Handler listing the client's own pending appointments, newest first.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/citas",
    responses(
        (status = 200, description = "Pending appointments", body = AppointmentListResponse)
    ),
    tag = "Citas"
))]
pub async fn list_pending_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
) -> Result<Json<AppointmentListResponse>, Rejection> {
    let client = require_client(&state, &headers).await?;
    let appointments = state
        .engine
        .list_client_pending(&client)
        .await
        .map_err(store_error_rejection)?;
    Ok(Json(AppointmentListResponse {
        appointments: appointments
            .into_iter()
            .map(|a| AppointmentOut::from_appointment(&state.engine, a))
            .collect(),
    }))
}

/// Handler for an appointment detail; it must belong to the caller.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/citas/{appointment_id}",
    responses(
        (status = 200, description = "Appointment detail", body = AppointmentOut),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Unknown appointment")
    ),
    tag = "Citas"
))]
pub async fn appointment_detail_handler(
    State(state): State<Arc<SchedulingState>>,
    headers: HeaderMap,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentOut>, Rejection> {
    let client = require_client(&state, &headers).await?;
    let appointment = state
        .engine
        .find_client_appointment(&client, appointment_id)
        .await
        .map_err(lookup_error_rejection)?;
    Ok(Json(AppointmentOut::from_appointment(
        &state.engine,
        appointment,
    )))
}
