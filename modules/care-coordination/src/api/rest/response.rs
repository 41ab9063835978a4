//! The `{message, data?}` envelope every successful response uses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Envelope plus status code.
pub struct Reply<T: Serialize> {
    status: StatusCode,
    body: Envelope<T>,
}

impl<T: Serialize> Reply<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data))
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(StatusCode::CREATED, message, Some(data))
    }

    fn with_status(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status,
            body: Envelope {
                message: message.into(),
                data,
            },
        }
    }
}

impl Reply<()> {
    /// Message-only reply, e.g. after a delete.
    pub fn message(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
