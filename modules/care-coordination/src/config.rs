//! Configuration for the care-coordination module.

use serde::{Deserialize, Serialize};
use time::Time;

/// Where rate-limit counters live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RateLimitConfig {
    pub backend: RateLimitBackend,
    /// Required when `backend` is `redis`.
    pub redis_url: Option<String>,
    pub window_secs: u64,
    /// Login and register attempts per client per window.
    pub auth_max: u64,
    /// Care-plan creates and deletes per client per window.
    pub care_plans_max: u64,
    /// Key clients by the first `X-Forwarded-For` entry instead of the peer
    /// address. Enable only behind a proxy that sets the header.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backend: RateLimitBackend::Memory,
            redis_url: None,
            window_secs: 15 * 60,
            auth_max: 5,
            care_plans_max: 20,
            trust_forwarded_for: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Daily trigger, UTC.
    pub hour: u8,
    pub minute: u8,
    pub run_on_startup: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour: 0,
            minute: 0,
            run_on_startup: false,
        }
    }
}

impl ReminderConfig {
    /// The trigger time.
    ///
    /// # Errors
    /// When `hour`/`minute` are out of range.
    pub fn run_at(&self) -> Result<Time, time::error::ComponentRange> {
        Time::from_hms(self.hour, self.minute, 0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CareConfig {
    pub max_tasks_per_plan: usize,
}

impl Default for CareConfig {
    fn default() -> Self {
        Self {
            max_tasks_per_plan: 50,
        }
    }
}
