use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::trace;

use super::{RateLimitError, RateLimitStore, WindowHit};

/// Sweep closed windows once every this many hits.
const SWEEP_EVERY: u64 = 1024;

#[derive(Debug, Clone, Copy)]
struct Window {
    opened: Instant,
    count: u64,
}

/// Process-local counters. Suitable for a single server instance.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: DashMap<String, Window>,
    hits: AtomicU64,
}

impl MemoryRateLimitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn hit_at(&self, key: &str, window: Duration, now: Instant) -> WindowHit {
        let state = {
            let mut entry = self.windows.entry(key.to_owned()).or_insert(Window {
                opened: now,
                count: 0,
            });
            if now.duration_since(entry.opened) >= window {
                *entry = Window {
                    opened: now,
                    count: 0,
                };
            }
            entry.count += 1;
            *entry
        };

        if self.hits.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep(window, now);
        }

        WindowHit {
            count: state.count,
            reset_after: window.saturating_sub(now.duration_since(state.opened)),
        }
    }

    fn sweep(&self, window: Duration, now: Instant) {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.duration_since(w.opened) < window);
        trace!(removed = before - self.windows.len(), "swept rate limit windows");
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.windows.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn hit(&self, key: &str, window: Duration) -> Result<WindowHit, RateLimitError> {
        Ok(self.hit_at(key, window, Instant::now()))
    }
}
