//! Bounded retry with cooperative cancellation

use super::backoff::{BackoffStrategy, ConstantBackoff};
use crate::error::MotofixError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success(T),
    /// Operation failed with a non-retryable error, or retries ran out
    Failed {
        /// The last error
        error: MotofixError,
        /// Total attempts made
        attempts: u32,
    },
    /// Operation was cancelled
    Cancelled,
}

impl<T> RetryResult<T> {
    /// Check if the result is successful
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Convert to Result; cancellation maps to [`MotofixError::Cancelled`]
    pub fn into_result(self) -> Result<T, MotofixError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Failed { error, .. } => Err(error),
            Self::Cancelled => Err(MotofixError::Cancelled),
        }
    }
}

/// Retry policy for operations
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Box<dyn BackoffStrategy>,
}

impl RetryPolicy {
    /// Retry up to `max_retries` times after the first attempt, waiting `delay` between tries
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: Box::new(ConstantBackoff::new(delay)),
        }
    }

    /// Maximum total attempts, first try included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Check if an error should be retried
    /// Note: attempt is 0-indexed
    pub fn should_retry(&self, error: &MotofixError, attempt: u32) -> bool {
        attempt < self.max_retries && error.is_transient()
    }

    /// Execute an operation with retries
    pub async fn execute<T, F, Fut>(
        &self,
        mut operation: F,
        cancel_token: Option<&CancellationToken>,
    ) -> RetryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, MotofixError>>,
    {
        let mut attempt = 0;

        loop {
            if cancel_token.is_some_and(|t| t.is_cancelled()) {
                return RetryResult::Cancelled;
            }

            let outcome = match cancel_token {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => return RetryResult::Cancelled,
                    outcome = operation() => outcome,
                },
                None => operation().await,
            };

            match outcome {
                Ok(result) => return RetryResult::Success(result),
                Err(error) => {
                    if !self.should_retry(&error, attempt) {
                        return RetryResult::Failed {
                            error,
                            attempts: attempt + 1,
                        };
                    }

                    let delay = self.backoff.delay_for_attempt(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts(),
                        ?delay,
                        "transient failure, retrying: {}",
                        error
                    );
                    attempt += 1;

                    match cancel_token {
                        Some(token) => tokio::select! {
                            _ = token.cancelled() => return RetryResult::Cancelled,
                            _ = sleep(delay) => {}
                        },
                        None => sleep(delay).await,
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(2, Duration::from_secs(1))
    }
}
