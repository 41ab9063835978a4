use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::api::rest::validation::ValidationError;
use crate::domain::error::DomainError;

/// Error half of every handler result: a status and the `{message}` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

/// Map a domain error to its HTTP status. Unexpected failures are logged here,
/// once, with the full error.
impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        let status = match &e {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::Conflict { .. } => StatusCode::CONFLICT,
            DomainError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            DomainError::Internal { .. } | DomainError::Database { .. } => {
                tracing::error!(error = ?e, "request failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (
                DomainError::not_found("Care plan", Uuid::nil()),
                StatusCode::NOT_FOUND,
                "Care plan not found",
            ),
            (
                DomainError::conflict("User with this email already exists"),
                StatusCode::CONFLICT,
                "User with this email already exists",
            ),
            (
                DomainError::InvalidCredentials,
                StatusCode::UNAUTHORIZED,
                "Invalid email or password",
            ),
            (
                DomainError::validation("bad"),
                StatusCode::BAD_REQUEST,
                "bad",
            ),
        ];
        for (err, status, message) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status, status);
            assert_eq!(api.message, message);
        }
    }

    #[test]
    fn database_errors_are_500() {
        let api = ApiError::from(DomainError::database("disk full"));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
