//! User-facing error messages

use super::classifiers::ErrorClass;
use super::types::MotofixError;

/// Error rendered for display to a driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFriendlyError {
    /// Short headline
    pub title: String,
    /// Message to show inline or in a notice
    pub message: String,
    /// Optional hint on what to do next
    pub suggestion: Option<String>,
}

impl From<&MotofixError> for UserFriendlyError {
    fn from(error: &MotofixError) -> Self {
        match (error.class(), error) {
            (ErrorClass::CredentialInvalid, _) => Self {
                title: "Session expired".into(),
                message: "Your session has expired. Please sign in again.".into(),
                suggestion: Some("Run `motofix login` with your phone number".into()),
            },
            (ErrorClass::Validation, MotofixError::Validation { message, .. }) => Self {
                title: "Check your details".into(),
                message: message.clone(),
                suggestion: None,
            },
            (ErrorClass::Transient, _) => Self {
                title: "Connection problem".into(),
                message: "We could not reach Motofix. Check your connection and try again."
                    .into(),
                suggestion: Some("Your request has not been lost; retry in a moment".into()),
            },
            _ => Self {
                title: "Something went wrong".into(),
                message: error.to_string(),
                suggestion: None,
            },
        }
    }
}
