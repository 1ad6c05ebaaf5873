//! Request pacing between calls to the classification/extraction service.
//!
//! The batch loop calls [`Pacer::pace`] between files. Which strategy runs is a
//! configuration choice; tests use [`NoPacing`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::config::run::PacingConfig;

/// Default wait between two files.
pub const DEFAULT_PACING_DELAY: Duration = Duration::from_millis(200);

#[async_trait]
pub trait Pacer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Suspends until the next request may start.
    async fn pace(&self);
}

/// Waits a fixed delay every time.
#[derive(Debug, Clone)]
pub struct FixedDelayPacer {
    delay: Duration,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        FixedDelayPacer { delay }
    }
}

impl Default for FixedDelayPacer {
    fn default() -> Self {
        FixedDelayPacer::new(DEFAULT_PACING_DELAY)
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    fn name(&self) -> &'static str {
        "FixedDelayPacer"
    }

    async fn pace(&self) {
        sleep(self.delay).await;
    }
}

/// No waiting at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPacing;

#[async_trait]
impl Pacer for NoPacing {
    fn name(&self) -> &'static str {
        "NoPacing"
    }

    async fn pace(&self) {}
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

/// Slowest rate a token bucket accepts.
pub const MIN_REQUESTS_PER_SECOND: f64 = 0.001;

/// Token bucket: up to `burst_size` requests back to back, then
/// `requests_per_second` sustained.
#[derive(Debug)]
pub struct TokenBucketPacer {
    requests_per_second: f64,
    burst_size: f64,
    state: Mutex<BucketState>,
}

impl TokenBucketPacer {
    /// Rates below [`MIN_REQUESTS_PER_SECOND`], or not finite, fall back to
    /// that minimum.
    pub fn new(requests_per_second: f64, burst_size: u32) -> Self {
        let requests_per_second =
            if requests_per_second.is_finite() && requests_per_second >= MIN_REQUESTS_PER_SECOND {
                requests_per_second
            } else {
                warn!(requests_per_second, "Invalid token bucket rate, using the minimum");
                MIN_REQUESTS_PER_SECOND
            };
        let burst_size = f64::from(burst_size.max(1));
        TokenBucketPacer {
            requests_per_second,
            burst_size,
            state: Mutex::new(BucketState {
                tokens: burst_size,
                last_refill: Instant::now(),
            }),
        }
    }

    fn refill(&self, state: &mut BucketState) {
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.last_refill = now;
        state.tokens = (state.tokens + elapsed * self.requests_per_second).min(self.burst_size);
    }
}

#[async_trait]
impl Pacer for TokenBucketPacer {
    fn name(&self) -> &'static str {
        "TokenBucketPacer"
    }

    async fn pace(&self) {
        loop {
            let wait = {
                let mut state = self.state.lock().await;
                self.refill(&mut state);
                if state.tokens >= 1.0 {
                    state.tokens -= 1.0;
                    return;
                }
                let missing = 1.0 - state.tokens;
                Duration::from_secs_f64(missing / self.requests_per_second)
            };
            debug!(wait_ms = wait.as_millis() as u64, "Waiting for pacing token");
            sleep(wait).await;
        }
    }
}

/// Builds the configured pacing strategy.
pub fn build_pacer(config: &PacingConfig) -> Arc<dyn Pacer> {
    match config {
        PacingConfig::FixedDelay { delay_ms } => {
            Arc::new(FixedDelayPacer::new(Duration::from_millis(*delay_ms)))
        }
        PacingConfig::TokenBucket {
            requests_per_second,
            burst_size,
        } => Arc::new(TokenBucketPacer::new(*requests_per_second, *burst_size)),
        PacingConfig::Disabled => Arc::new(NoPacing),
    }
}
