use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use salon_core::models::work_schedule::{ScheduleException, WorkSchedule};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{actor::CurrentActor, error_handling::AppError},
};

#[axum::debug_handler]
pub async fn get_work_schedule(
    State(state): State<Arc<ApiState>>,
    Path(master_id): Path<Uuid>,
) -> Result<Json<Vec<WorkSchedule>>, AppError> {
    let rows = state.bookings.work_schedule(master_id).await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn replace_work_schedule(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(master_id): Path<Uuid>,
    payload: Result<Json<Vec<WorkSchedule>>, JsonRejection>,
) -> Result<Json<Vec<WorkSchedule>>, AppError> {
    let Json(rows) = payload?;
    let saved = state
        .bookings
        .replace_work_schedule(&actor, master_id, rows)
        .await?;

    Ok(Json(saved))
}

#[axum::debug_handler]
pub async fn get_exceptions(
    State(state): State<Arc<ApiState>>,
    Path(master_id): Path<Uuid>,
) -> Result<Json<Vec<ScheduleException>>, AppError> {
    let rows = state.bookings.exceptions(master_id).await?;
    Ok(Json(rows))
}

#[axum::debug_handler]
pub async fn replace_exceptions(
    State(state): State<Arc<ApiState>>,
    CurrentActor(actor): CurrentActor,
    Path(master_id): Path<Uuid>,
    payload: Result<Json<Vec<ScheduleException>>, JsonRejection>,
) -> Result<Json<Vec<ScheduleException>>, AppError> {
    let Json(rows) = payload?;
    let saved = state
        .bookings
        .replace_exceptions(&actor, master_id, rows)
        .await?;

    Ok(Json(saved))
}
