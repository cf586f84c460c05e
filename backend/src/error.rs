//! Unified error handling for the HTTP layer.
//!
//! Handlers return `ApiResult` and use `?` on service and store calls; the
//! error is logged and translated into a status code with a JSON
//! `ErrorResponse` body here.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use timer_shared::api::ErrorResponse;

use crate::google::ProviderError;

pub const NO_CONFIGURATION: &str = "No Google Calendar configuration found";

/// Unified error type for API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// No token pair stored, or it can no longer be used
    #[error("{}", NO_CONFIGURATION)]
    Unauthenticated,

    /// The event does not exist at the provider
    #[error("Event {0} not found")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failure talking to Google
    #[error("Calendar provider error: {0}")]
    Provider(#[source] ProviderError),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unauthenticated => ApiError::Unauthenticated,
            ProviderError::NotFound(id) => ApiError::NotFound(id),
            other => ApiError::Provider(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Unauthenticated => {
                tracing::warn!("Request without usable Google credentials");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new(NO_CONFIGURATION),
                )
            }
            ApiError::NotFound(id) => {
                tracing::warn!("Event not found: {}", id);
                (StatusCode::NOT_FOUND, ErrorResponse::new("Event not found"))
            }
            ApiError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, ErrorResponse::new(msg.clone()))
            }
            ApiError::Provider(e) => {
                tracing::error!("Calendar provider error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Calendar request failed", e.to_string()),
                )
            }
            ApiError::Template(e) => {
                tracing::error!("Template rendering failed: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("Could not render page"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
