use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use salon_core::models::appointment::{
    Appointment, AppointmentHistoryEntry, CancelAppointmentRequest, CreateAppointmentRequest,
    MasterAppointmentsQuery, RescheduleAppointmentRequest, SlotsQuery,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{actor::CurrentActor, error_handling::AppError},
};

#[axum::debug_handler]
pub async fn free_slots(
    State(state): State<Arc<ApiState>>,
    query: Result<Query<SlotsQuery>, QueryRejection>,
) -> Result<Json<Vec<DateTime<Utc>>>, AppError> {
    let Query(query) = query?;
    let slots = state
        .bookings
        .free_slots(query.master_id, query.service_id, query.date)
        .await?;

    Ok(Json(slots))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    payload: Result<Json<CreateAppointmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let Json(payload) = payload?;
    let appointment = state
        .bookings
        .create(
            actor.id,
            payload.master_id,
            payload.service_id,
            payload.start_time,
            payload.notes,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(appointment)))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.bookings.list_for_client(&actor).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn master_appointments(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    query: Result<Query<MasterAppointmentsQuery>, QueryRejection>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let Query(query) = query?;
    let appointments = state
        .bookings
        .list_for_master(&actor, query.master_id, query.from, query.to)
        .await?;

    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.bookings.get(&actor, id).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn appointment_history(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<AppointmentHistoryEntry>>, AppError> {
    let history = state.bookings.history(&actor, id).await?;
    Ok(Json(history))
}

/// The body is optional; an empty request cancels without a reason, while a
/// body that is present must be a valid `{"reason"}` object.
#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<Appointment>, AppError> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        CancelAppointmentRequest::default()
    } else {
        let Json(payload) = Json::<CancelAppointmentRequest>::from_bytes(&body)?;
        payload
    };
    let appointment = state.bookings.cancel(&actor, id, payload.reason).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
    payload: Result<Json<RescheduleAppointmentRequest>, JsonRejection>,
) -> Result<Json<Appointment>, AppError> {
    let Json(payload) = payload?;
    let appointment = state
        .bookings
        .reschedule(&actor, id, payload.start_time)
        .await?;

    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn confirm_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.bookings.confirm(&actor, id).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.bookings.complete(&actor, id).await?;
    Ok(Json(appointment))
}
