//! Error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use lodgebook_shared::AppError;
use serde_json::json;
use tracing::error;

/// An `AppError` on its way out as an HTTP response.
///
/// Every repository error converts into it, so handlers can use `?`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl<E> From<E> for ApiError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    /// Shorthand for a request that failed validation at the HTTP edge.
    pub fn validation(message: impl Into<String>) -> Self {
        Self(AppError::Validation(message.into()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side details stay in the logs.
        let message = if self.0.is_client_error() {
            self.0.to_string()
        } else {
            error!(error = %self.0, "Request failed");
            "An error occurred".to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message
            })),
        )
            .into_response()
    }
}
