use crate::auth::AuthError;
use crate::oauth::ExchangeError;
use crate::settings::WriteError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::error;

/// Error response
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Application error types for all endpoints
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    UnsupportedMediaType(String),
    PayloadTooLarge(String),
    ServerError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::UnsupportedMediaType(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::ServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Store(inner) => {
                error!(error = %inner, "Credential check failed");
                ApiError::ServerError("Failed to verify credentials".to_string())
            }
            other => ApiError::Unauthorized(format!("Unauthorized: {}", other.reason())),
        }
    }
}

impl From<ExchangeError> for ApiError {
    fn from(e: ExchangeError) -> Self {
        match e {
            ExchangeError::BadRequest(_) | ExchangeError::InvalidCode(_) => {
                ApiError::BadRequest(e.to_string())
            }
            ExchangeError::UpstreamUnavailable(_) => ApiError::ServerError(e.to_string()),
            ExchangeError::Store(inner) => {
                error!(error = %inner, "Failed to issue secret");
                ApiError::ServerError("Failed to issue secret".to_string())
            }
        }
    }
}

impl From<WriteError> for ApiError {
    fn from(e: WriteError) -> Self {
        match e {
            WriteError::UnsupportedMediaType(_) => ApiError::UnsupportedMediaType(e.to_string()),
            WriteError::PayloadTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            WriteError::Store(inner) => ApiError::from(inner),
        }
    }
}

/// Store and other infrastructure failures. Details are logged, not returned.
impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        error!(error = %format!("{:#}", e), "Request failed");
        ApiError::ServerError("Internal server error".to_string())
    }
}
