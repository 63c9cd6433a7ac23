//! Retry support for transient failures
//!
//! Only errors classified as [`ErrorClass::Transient`](crate::error::ErrorClass)
//! are retried. Credential and validation failures return immediately.

pub mod backoff;
pub mod retry;

pub use backoff::{BackoffStrategy, ConstantBackoff};
pub use retry::{RetryPolicy, RetryResult};
