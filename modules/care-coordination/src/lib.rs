//! CareLink care-coordination module.
//!
//! Users, care plans and their tasks, appointments, notifications with a
//! per-user real-time channel, a daily reminder scan, and the per-user record
//! resources (emergency alerts, medications, file metadata, family links and
//! messages), exposed as a JSON REST API under `/api`.

pub mod api;
pub mod config;
pub mod domain;
pub mod infra;
pub mod module;

pub use config::{CareConfig, RateLimitBackend, RateLimitConfig, ReminderConfig};
pub use module::{CareModule, CareModuleConfig};
