use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::trace;

use super::{RateLimitError, RateLimitStore, WindowHit};

/// Counters shared by every server instance pointing at the same Redis.
///
/// Windows are aligned to wall-clock multiples of the window length: the key carries
/// the window index, `INCR` counts, and `EXPIRE` lets Redis drop the key once the
/// window has passed.
#[derive(Clone)]
pub struct RedisRateLimitStore {
    client: redis::Client,
    prefix: String,
}

impl RedisRateLimitStore {
    /// # Errors
    /// Returns an error if `url` is not a valid Redis URL.
    pub fn new(url: &str, prefix: &str) -> Result<Self, RateLimitError> {
        let client =
            redis::Client::open(url).map_err(|e| RateLimitError::Backend(e.to_string()))?;
        Ok(Self {
            client,
            prefix: prefix.to_owned(),
        })
    }
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitError> {
        let window_secs = window.as_secs().max(1);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| RateLimitError::Backend(e.to_string()))?
            .as_secs();
        let index = now / window_secs;
        let window_key = format!("{}:rl:{key}:{index}", self.prefix);

        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;
        let count: u64 = conn
            .incr(&window_key, 1_u64)
            .await
            .map_err(|e| RateLimitError::Backend(e.to_string()))?;
        if count == 1 {
            let ttl = i64::try_from(window_secs).unwrap_or(i64::MAX);
            let _: bool = conn
                .expire(&window_key, ttl)
                .await
                .map_err(|e| RateLimitError::Backend(e.to_string()))?;
        }
        trace!(key = %window_key, count, "rate limit hit");

        Ok(WindowHit {
            count,
            reset_after: Duration::from_secs((index + 1) * window_secs - now),
        })
    }
}
