//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use webthing_domain::error::{NotFoundError, ValidationError, WebThingError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`WebThingError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(WebThingError);

impl From<WebThingError> for ApiError {
    fn from(err: WebThingError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<NotFoundError> for ApiError {
    fn from(err: NotFoundError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            WebThingError::Validation(_) => StatusCode::BAD_REQUEST,
            WebThingError::NotFound(_) => StatusCode::NOT_FOUND,
            WebThingError::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
            WebThingError::Transition(_) => StatusCode::CONFLICT,
            WebThingError::Registration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::from(ValidationError::MalformedMessage {
            reason: reason.into(),
        })
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::from(NotFoundError::new(entity, id))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self.0, %status, "request failed");
        } else {
            tracing::debug!(error = %self.0, %status, "request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}
