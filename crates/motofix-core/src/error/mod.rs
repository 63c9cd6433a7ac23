//! Error types for the Motofix client
//!
//! Every fallible operation in the workspace returns [`MotofixResult`]. Errors are
//! classified into [`ErrorClass`] buckets which drive the session and retry logic:
//! - credential-invalid: the server rejected the bearer token (HTTP 401)
//! - transient: timeouts, unreachable hosts and 5xx responses
//! - validation: any other 4xx, or a form that failed local validation

mod classifiers;
mod constructors;
mod types;
mod user_messages;

pub use classifiers::ErrorClass;
pub use types::{MotofixError, MotofixResult};
pub use user_messages::UserFriendlyError;
