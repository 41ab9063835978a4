use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken(String),

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated | AuthError::TokenExpired | AuthError::InvalidToken(_) => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Signing(_) | AuthError::PasswordHash(_) | AuthError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "auth layer failure");
        } else {
            tracing::debug!(error = ?self, "request rejected by auth layer");
        }

        let body = Json(json!({ "message": self.to_string() }));
        (status, body).into_response()
    }
}
