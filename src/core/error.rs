use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::constants::GENERIC_ERROR_MESSAGE;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The request to the backend never completed (connection refused, reset,
    /// timed out, unreadable body).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered but reported a failure. Carries the backend's
    /// `error` string when it sent one.
    #[error("Backend error: {}", .0.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Backend(Option<String>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message suitable for showing to the admin user.
    ///
    /// Backend messages are passed through verbatim, network failures collapse
    /// into the generic localized message.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Network(_) | AppError::Internal(_) => GENERIC_ERROR_MESSAGE.to_string(),
            AppError::Backend(msg) => msg
                .clone()
                .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string()),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.user_message();
        let (status, errors) = match self {
            AppError::Network(ref e) => {
                tracing::error!("Backend unreachable: {}", e);
                (StatusCode::BAD_GATEWAY, None)
            }
            AppError::Backend(ref msg) => {
                tracing::warn!("Backend rejected request: {:?}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, None)
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            AppError::Validation(ref msg) => (StatusCode::BAD_REQUEST, Some(vec![msg.clone()])),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, None),
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
