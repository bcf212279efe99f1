use axum::{
    Router,
    routing::{get, patch, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::appointments};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/appointments/slots", get(appointments::free_slots))
        .route("/api/appointments/my", get(appointments::my_appointments))
        .route(
            "/api/appointments",
            post(appointments::create_appointment).get(appointments::master_appointments),
        )
        .route("/api/appointments/:id", get(appointments::get_appointment))
        .route(
            "/api/appointments/:id/history",
            get(appointments::appointment_history),
        )
        .route(
            "/api/appointments/:id/cancel",
            patch(appointments::cancel_appointment),
        )
        .route(
            "/api/appointments/:id/reschedule",
            patch(appointments::reschedule_appointment),
        )
        .route(
            "/api/appointments/:id/confirm",
            post(appointments::confirm_appointment),
        )
        .route(
            "/api/appointments/:id/complete",
            post(appointments::complete_appointment),
        )
}
