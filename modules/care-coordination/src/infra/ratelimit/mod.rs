//! Fixed-window request counters.
//!
//! A window is identified by its key; the first hit opens it, and hits are counted
//! until `window` has elapsed since that first hit. The HTTP middleware decides what
//! a key is and what limit applies.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryRateLimitStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisRateLimitStore;

#[derive(Error, Debug)]
pub enum RateLimitError {
    #[error("rate limit backend unavailable: {0}")]
    Backend(String),
}

/// Counter state after recording one hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowHit {
    /// Hits in the current window, including this one.
    pub count: u64,
    /// Time until the window closes.
    pub reset_after: Duration,
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record a hit for `key` and return the window state.
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitError>;
}
