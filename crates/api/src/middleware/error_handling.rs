//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies so every
//! endpoint fails the same way.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use salon_core::errors::SalonError;
use serde_json::json;
use tracing::error;

/// Application error wrapper that provides HTTP status code mapping
///
/// `AppError` wraps [`SalonError`] and implements `IntoResponse`, so handlers
/// can return `Result<_, AppError>` and use `?` on service calls.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use salon_api::middleware::error_handling::AppError;
/// use salon_core::errors::SalonError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(SalonError::NotFound("Appointment not found".into()).into());
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub SalonError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            SalonError::NotFound(_) => StatusCode::NOT_FOUND,
            SalonError::Validation(_) => StatusCode::BAD_REQUEST,
            SalonError::Conflict(_) => StatusCode::CONFLICT,
            SalonError::Authentication(_) => StatusCode::UNAUTHORIZED,
            SalonError::Authorization(_) => StatusCode::FORBIDDEN,
            SalonError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SalonError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<SalonError> for AppError {
    fn from(err: SalonError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(SalonError::Database(err))
    }
}

/// Malformed JSON bodies are client input errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError(SalonError::Validation(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError(SalonError::Validation(rejection.body_text()))
    }
}

/// Maps a SalonError to an HTTP response
pub fn map_error(err: SalonError) -> Response {
    AppError(err).into_response()
}
