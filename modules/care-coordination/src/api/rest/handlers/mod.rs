//! Axum handlers, one module per resource. Each handler authenticates (via the
//! [`AuthUser`](carelink_auth::AuthUser) extractor), validates (via
//! [`ValidJson`](crate::api::rest::validation::ValidJson) and `parse_id`), calls
//! one service operation and wraps the result in the response envelope.

pub mod appointments;
pub mod care_plans;
pub mod notifications;
pub mod records;
pub mod users;

use crate::api::rest::response::Reply;

/// Liveness probe.
pub async fn health() -> Reply<()> {
    Reply::message("ok")
}
