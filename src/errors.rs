use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::{BookingAction, BookingStatus};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("cannot {action} a booking that is {from}")]
    InvalidTransition {
        from: BookingStatus,
        action: BookingAction,
    },

    #[error("invalid booking: {0}")]
    InvalidBooking(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("notification failure: {0}")]
    NotificationFailure(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("setup required")]
    SetupRequired,
}

impl From<anyhow::Error> for AppError {
    fn from(e: anyhow::Error) -> Self {
        match e.downcast::<AppError>() {
            Ok(app) => app,
            Err(e) => AppError::PersistenceFailure(format!("{e:#}")),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::InvalidBooking(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::PersistenceFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotificationFailure(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::SetupRequired => StatusCode::CONFLICT,
        };

        let body = serde_json::json!({ "error": self.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
