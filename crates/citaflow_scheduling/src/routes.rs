// --- File: crates/citaflow_scheduling/src/routes.rs ---

use crate::engine::SchedulingEngine;
use crate::handlers::{
    appointment_detail_handler, attend_handler, available_days_handler, available_slots_handler,
    book_handler, cancel_handler, list_pending_handler, remaining_handler, SchedulingState,
};
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all routes for the appointment feature.
pub fn routes(engine: Arc<SchedulingEngine>) -> Router {
    let state = Arc::new(SchedulingState { engine });

    Router::new()
        .route("/citas/available-days", get(available_days_handler))
        .route("/citas/available-slots", get(available_slots_handler))
        .route("/citas/book", post(book_handler))
        .route("/citas/remaining", get(remaining_handler))
        .route("/citas/cancel/{appointment_id}", patch(cancel_handler))
        .route("/citas/attend/{appointment_id}", patch(attend_handler))
        .route("/citas/{appointment_id}", get(appointment_detail_handler))
        .route("/citas", get(list_pending_handler))
        .with_state(state)
}
