// File: crates/citaflow_scheduling/src/doc.rs

#![cfg(feature = "openapi")]
use crate::booking::BookingRequest;
use crate::handlers::{
    AppointmentListResponse, AppointmentOut, AttendRequest, AvailableDaysResponse,
    AvailableSlotsResponse, RemainingResponse,
};
use crate::models::AppointmentStatus;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::available_days_handler,
        crate::handlers::available_slots_handler,
        crate::handlers::book_handler,
        crate::handlers::cancel_handler,
        crate::handlers::attend_handler,
        crate::handlers::remaining_handler,
        crate::handlers::list_pending_handler,
        crate::handlers::appointment_detail_handler
    ),
    components(
        schemas(
            AvailableDaysResponse,
            AvailableSlotsResponse,
            BookingRequest,
            AttendRequest,
            RemainingResponse,
            AppointmentOut,
            AppointmentListResponse,
            AppointmentStatus
        )
    ),
    tags(
        (name = "Citas", description = "Citizen appointment booking API")
    ),
    servers(
        (url = "/api", description = "Appointment API server")
    )
)]
pub struct CitasApiDoc;
