//! Error responses for HTTP handlers.
//!
//! [`AppError`] carries a status, a stable machine-readable code and a
//! user-facing message. Domain errors convert into it with `?`:
//!
//! | `ConferenceError`      | Status | Code                  |
//! |------------------------|--------|-----------------------|
//! | `Unauthenticated`      | 401    | `UNAUTHORIZED`        |
//! | `Forbidden`            | 403    | `FORBIDDEN`           |
//! | `NotFound`             | 404    | `NOT_FOUND`           |
//! | `BadRequest`           | 400    | `BAD_REQUEST`         |
//! | `InvalidFilter`        | 400    | `INVALID_FILTER`      |
//! | `Conflict`             | 409    | `CONFLICT`            |
//! | `TransactionConflict`  | 503    | `SERVICE_UNAVAILABLE` |
//! | `Storage`/`Cache`/`Queue` | 500 | `INTERNAL_SERVER_ERROR` |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use conference_core::ConferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<ConferenceForm>, AppError> {
///     let form = state.service.get_conference(&caller, &key).await?;
///     Ok(Json(form))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: &'static str,
    /// Internal error, logged but not exposed to the client
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            code,
            source: None,
        }
    }

    /// Attach the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", message)
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR", message)
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE", message)
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<ConferenceError> for AppError {
    fn from(error: ConferenceError) -> Self {
        let message = error.to_string();
        match error {
            ConferenceError::Unauthenticated => Self::unauthorized(message),
            ConferenceError::Forbidden(_) => Self::forbidden(message),
            ConferenceError::NotFound { .. } => Self::not_found(message),
            ConferenceError::BadRequest(_) => Self::bad_request(message),
            ConferenceError::InvalidFilter(_) => {
                Self::new(StatusCode::BAD_REQUEST, "INVALID_FILTER", message)
            },
            ConferenceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            ConferenceError::TransactionConflict(_) => {
                Self::unavailable("The request conflicted with another update, please retry")
                    .with_source(anyhow::anyhow!(message))
            },
            ConferenceError::Storage(_) | ConferenceError::Cache(_) | ConferenceError::Queue(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::anyhow!(message))
            },
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable code
    pub code: String,
    /// Human-readable message
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "Request failed"
                ),
                None => tracing::error!(status = %self.status, code = self.code, "Request failed"),
            }
        } else {
            tracing::debug!(status = %self.status, code = self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorBody {
            code: self.code.to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conference_core::ConflictReason;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (ConferenceError::Unauthenticated, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            (ConferenceError::Forbidden("x".into()), StatusCode::FORBIDDEN, "FORBIDDEN"),
            (ConferenceError::not_found("conference", "abc"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (ConferenceError::bad_request("x"), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (ConferenceError::invalid_filter("x"), StatusCode::BAD_REQUEST, "INVALID_FILTER"),
            (
                ConferenceError::Conflict(ConflictReason::SeatsExhausted),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                ConferenceError::TransactionConflict("deadlock".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
            (
                ConferenceError::Storage("disk".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let app = AppError::from(error);
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[test]
    fn internal_details_stay_out_of_the_message() {
        let app = AppError::from(ConferenceError::Storage("password=hunter2".into()));
        assert!(!app.message().contains("hunter2"));
        assert!(std::error::Error::source(&app).is_some());
    }

    #[test]
    fn not_found_keeps_the_domain_message() {
        let app = AppError::from(ConferenceError::not_found("conference", "abc"));
        assert_eq!(app.to_string(), "[NOT_FOUND] No conference found with key: abc");
    }
}
