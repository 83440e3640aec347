use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use speakercheck_data::DataError;

/// Standard API error body; `message` is shown to users as is.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// Handler error: a data-layer failure, a malformed request body, or a
/// failure outside the store (e.g. a panicked blocking task).
#[derive(Debug)]
pub enum ApiError {
    Data(DataError),
    BadRequest(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Data(err) => match err {
                DataError::MissingField(_)
                | DataError::InvalidDate(_)
                | DataError::InvalidTime(_)
                | DataError::DateInPast(_)
                | DataError::IncompleteAvailability(_)
                | DataError::InvalidRole(_) => StatusCode::BAD_REQUEST,
                DataError::InvalidCredentials | DataError::Unauthenticated => {
                    StatusCode::UNAUTHORIZED
                }
                DataError::Forbidden(_) => StatusCode::FORBIDDEN,
                DataError::NotFound { .. } => StatusCode::NOT_FOUND,
                DataError::InvalidTransition { .. }
                | DataError::VersionConflict { .. }
                | DataError::PageNotEmpty(_)
                | DataError::UsernameTaken(_) => StatusCode::CONFLICT,
                DataError::Database(_) | DataError::PasswordHash(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::BadRequest(message) => message.clone(),
            ApiError::Internal(_)
            | ApiError::Data(DataError::Database(_) | DataError::PasswordHash(_)) => {
                "Internal server error".to_string()
            }
            ApiError::Data(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::Data(err) => tracing::error!(error = %err, "request failed"),
                ApiError::Internal(detail) => tracing::error!(error = %detail, "request failed"),
                ApiError::BadRequest(_) => {}
            }
        }
        let body = Json(ErrorResponse {
            message: self.message(),
        });
        (status, body).into_response()
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError::Data(err)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
