use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

/// Length of one fixed window.
pub const WINDOW: Duration = Duration::from_secs(60);

/// Requests accepted per identifier within one window.
pub const MAX_REQUESTS_PER_WINDOW: u32 = 3;

/// Identifier shared by every client we cannot identify.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Request count for one identifier within its current window.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitWindow {
    pub count: u32,
    pub reset_at: Instant,
}

/// Fixed-window request counter keyed by client identifier.
///
/// Constructed once at startup and shared through `AppState`. The shard
/// lock taken by `DashMap::entry` is held across the check and the
/// increment, so concurrent callers with the same identifier cannot both
/// take the last slot.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, RateLimitWindow>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, identifier: &str) -> bool {
        self.check_at(identifier, Instant::now())
    }

    pub fn check_at(&self, identifier: &str, now: Instant) -> bool {
        let mut window = self
            .windows
            .entry(identifier.to_string())
            .or_insert(RateLimitWindow {
                count: 0,
                reset_at: now + WINDOW,
            });

        // Expired (or freshly inserted) window starts over
        if window.count == 0 || now >= window.reset_at {
            *window = RateLimitWindow {
                count: 1,
                reset_at: now + WINDOW,
            };
            return true;
        }

        if window.count >= MAX_REQUESTS_PER_WINDOW {
            return false;
        }

        window.count += 1;
        true
    }

    /// Drop windows that have already expired. An expired window behaves
    /// exactly like a missing one, so this never changes a later decision.
    pub fn evict_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows.retain(|_, window| now < window.reset_at);
        before.saturating_sub(self.windows.len())
    }

    /// Number of identifiers currently tracked.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Background task that bounds the window table.
pub async fn run_sweep_loop(limiter: Arc<RateLimiter>, interval: Duration) {
    let mut interval = tokio::time::interval(interval);

    loop {
        interval.tick().await;

        // Tokio's clock, so paused test time drives the sweep
        let evicted = limiter.evict_expired(tokio::time::Instant::now().into_std());
        if evicted > 0 {
            debug!(evicted, remaining = limiter.len(), "Rate limit sweep");
        }
    }
}
