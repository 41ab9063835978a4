//! Request validation.
//!
//! Request DTOs implement [`Validate`], turning the raw JSON shape into a domain
//! input or the first rule violation. Handlers take [`ValidJson<T>`] instead of
//! `Json<T>`, so a handler body never runs on invalid input.

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use axum::Json;
use axum::extract::{FromRequest, Request};
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::api::rest::error::ApiError;
use crate::domain::ports::{Clock, to_stored_precision};

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex should not panic")
});

#[allow(clippy::expect_used)] // good regex, it doesn't panic
static HHMM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("static regex should not panic")
});

/// First rule violation found in a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Per-request inputs to validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidationCtx {
    pub now: OffsetDateTime,
    pub max_tasks_per_plan: usize,
}

/// Router-level settings; turned into a [`ValidationCtx`] per request.
#[derive(Clone)]
pub struct ValidationSettings {
    pub clock: Arc<dyn Clock>,
    pub max_tasks_per_plan: usize,
}

impl ValidationSettings {
    #[must_use]
    pub fn context(&self) -> ValidationCtx {
        ValidationCtx {
            now: self.clock.now(),
            max_tasks_per_plan: self.max_tasks_per_plan,
        }
    }
}

pub trait Validate {
    type Output;

    /// # Errors
    /// The first violated rule.
    fn validate(self, ctx: &ValidationCtx) -> Result<Self::Output, ValidationError>;
}

/// JSON body that passed [`Validate`]; holds the validated output.
pub struct ValidJson<T: Validate>(pub T::Output);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let settings = req
            .extensions()
            .get::<ValidationSettings>()
            .cloned()
            .ok_or_else(|| ApiError::internal("validation settings are not installed"))?;
        let Json(body) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        let ctx = settings.context();
        body.validate(&ctx).map(ValidJson).map_err(ApiError::from)
    }
}

/// Path ids are strings until proven otherwise.
///
/// # Errors
/// `400 Invalid id` when `raw` is not a UUID.
pub fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid id"))
}

// ==================== Rules ====================

/// `min..=max` characters, counted as Unicode scalar values.
pub(crate) fn length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(if min <= 1 && n == 0 {
            ValidationError::new(format!("{field} is required"))
        } else {
            ValidationError::new(format!(
                "{field} must be between {min} and {max} characters"
            ))
        });
    }
    Ok(())
}

pub(crate) fn max_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::new(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Trimmed, lowercased address.
pub(crate) fn email(value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.len() > 254 || !EMAIL_REGEX.is_match(value) {
        return Err(ValidationError::new("Please provide a valid email"));
    }
    Ok(value.to_lowercase())
}

pub(crate) fn hhmm(value: &str) -> Result<(), ValidationError> {
    if !HHMM_REGEX.is_match(value) {
        return Err(ValidationError::new("Time must be in HH:mm format"));
    }
    Ok(())
}

/// RFC 3339 timestamp, normalised to UTC and truncated to whole seconds.
pub(crate) fn datetime(field: &str, value: &str) -> Result<OffsetDateTime, ValidationError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map(|dt| to_stored_precision(dt.to_offset(time::UtcOffset::UTC)))
        .map_err(|_| ValidationError::new(format!("{field} must be a valid ISO 8601 date")))
}

pub(crate) fn one_of<E: FromStr>(
    field: &str,
    value: &str,
    allowed: &[E],
) -> Result<E, ValidationError>
where
    E: std::fmt::Display,
{
    value.parse().map_err(|_| {
        let names: Vec<String> = allowed.iter().map(ToString::to_string).collect();
        ValidationError::new(format!("{field} must be one of: {}", names.join(", ")))
    })
}
