use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Request-terminal errors for the proxy service.
///
/// Every variant maps to exactly one client-visible `{ "error": ... }` body.
/// Upstream bodies and internal causes are logged, never sent to the caller.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("API key is not configured")]
    NotConfigured,

    #[error("Upstream request failed with status {0}")]
    UpstreamStatus(u16),

    #[error("Upstream response was not in the expected format")]
    UpstreamFormat,

    #[error("Upstream blocked the response for safety reasons")]
    ContentBlocked,

    #[error("Upstream returned no usable candidate")]
    EmptyResponse,

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl AppError {
    /// Status code and client-facing message for this error.
    ///
    /// `UpstreamStatus` forwards the upstream code verbatim; everything the
    /// caller must not see stays out of the message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::ValidationError(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method Not Allowed".to_string(),
            ),
            AppError::NotConfigured => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "API key is not configured on the server.".to_string(),
            ),
            AppError::UpstreamStatus(code) => (
                StatusCode::from_u16(*code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                format!("Gemini API request failed with status {}", code),
            ),
            AppError::UpstreamFormat => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The API returned a response in an invalid format.".to_string(),
            ),
            AppError::ContentBlocked => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "The request was blocked by the API for safety reasons.".to_string(),
            ),
            AppError::EmptyResponse => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get a valid response from the API.".to_string(),
            ),
            AppError::InternalError(_) | AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred.".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
        }

        // The generic 500 hides the cause from the caller, so record it here.
        match &self {
            AppError::InternalError(err) => {
                tracing::error!(error = ?err, "request failed with internal error");
            }
            AppError::ConfigError(err) => {
                tracing::error!(error = ?err, "request failed with configuration error");
            }
            _ => {}
        }

        let (status, error) = self.status_and_message();

        (status, Json(ErrorResponse { error })).into_response()
    }
}
