//! Backoff strategies for retry operations

use std::time::Duration;

/// Backoff strategy trait
pub trait BackoffStrategy: Send + Sync {
    /// Get the delay before retry number `attempt` (0-indexed)
    fn delay_for_attempt(&self, attempt: u32) -> Duration;
}

/// Constant backoff - same delay for all attempts
#[derive(Debug, Clone)]
pub struct ConstantBackoff {
    delay: Duration,
}

impl ConstantBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl BackoffStrategy for ConstantBackoff {
    fn delay_for_attempt(&self, _attempt: u32) -> Duration {
        self.delay
    }
}
