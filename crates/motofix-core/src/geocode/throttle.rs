//! Minimum-spacing rate limiter

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Guarantees at least `min_interval` between the starts of consecutive calls
///
/// Callers are not queued in any particular order; each one waits for the lock,
/// then for whatever is left of the interval since the previous call.
#[derive(Debug)]
pub struct MinIntervalLimiter {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl MinIntervalLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    /// Wait until a call may start, and record it as started
    pub async fn acquire(&self) -> Instant {
        let mut last_call = self.last_call.lock().await;

        if let Some(previous) = *last_call {
            let ready_at = previous + self.min_interval;
            if ready_at > Instant::now() {
                tracing::trace!(
                    wait_ms = ready_at.saturating_duration_since(Instant::now()).as_millis() as u64,
                    "throttling call"
                );
                sleep_until(ready_at).await;
            }
        }

        let started = Instant::now();
        *last_call = Some(started);
        started
    }

    /// Remaining wait before a call could start right now
    pub async fn remaining(&self) -> Duration {
        match *self.last_call.lock().await {
            Some(previous) => (previous + self.min_interval).saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

impl Default for MinIntervalLimiter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}
