use axum::{Router, routing::get};
use std::sync::Arc;

use crate::{ApiState, handlers::masters};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/masters/:id/schedule",
            get(masters::get_work_schedule).put(masters::replace_work_schedule),
        )
        .route(
            "/api/masters/:id/exceptions",
            get(masters::get_exceptions).put(masters::replace_exceptions),
        )
}
