//! HTTP handlers for translate-service.

pub mod health;
pub mod phrase;
pub mod translate;

pub use health::{health_check, readiness_check};
pub use phrase::phrase;
pub use translate::translate;

use service_core::error::AppError;

/// Method fallback for the API routes.
///
/// The platform default 405 carries an empty body; the API contract requires
/// the JSON error body on every failure, this one included.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
