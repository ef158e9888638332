use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::scheduling::{BookingError, CancellationError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Booking error: {0}")]
    Booking(#[from] BookingError),

    #[error("Cancellation error: {0}")]
    Cancellation(#[from] CancellationError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Database(ref err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Conflict => (StatusCode::CONFLICT, "Resource conflict"),
                DatabaseError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input data"),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Booking(ref err) => match err {
                BookingError::InvalidRequest(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid booking request")
                }
                BookingError::Conflict => (
                    StatusCode::CONFLICT,
                    "The requested slot is no longer available",
                ),
                BookingError::HostNotFound | BookingError::EventTypeNotFound => {
                    (StatusCode::NOT_FOUND, "Resource not found")
                }
                BookingError::UpstreamUnavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Meeting provider unavailable",
                ),
                BookingError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Cancellation(ref err) => match err {
                CancellationError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                CancellationError::AuthorizationDenied => (StatusCode::FORBIDDEN, "Access denied"),
                CancellationError::Store(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "details": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
