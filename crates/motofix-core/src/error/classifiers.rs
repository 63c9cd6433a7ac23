//! Error classification used by the session verifier and retry policy

use super::types::MotofixError;

/// Error classification for recovery decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The bearer token was rejected; the session must be dropped
    CredentialInvalid,
    /// Timeouts, network failures and 5xx; worth retrying
    Transient,
    /// The request itself was rejected; show the message, change nothing
    Validation,
    /// Local failures that will not go away on retry
    Permanent,
}

impl MotofixError {
    /// Classify this error
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Unauthorized { .. } => ErrorClass::CredentialInvalid,
            Self::Network { .. } | Self::Timeout { .. } => ErrorClass::Transient,
            Self::Http { status_code, .. } => match status_code {
                Some(429) => ErrorClass::Transient,
                Some(code) if *code >= 500 => ErrorClass::Transient,
                Some(_) => ErrorClass::Validation,
                None => ErrorClass::Transient,
            },
            Self::Validation { .. } => ErrorClass::Validation,
            Self::Storage { .. }
            | Self::Json { .. }
            | Self::Io { .. }
            | Self::Config { .. }
            | Self::Cancelled
            | Self::Other { .. } => ErrorClass::Permanent,
        }
    }

    /// Check if this error is worth retrying
    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Check if this error means the stored credential is no longer valid
    pub fn is_credential_invalid(&self) -> bool {
        self.class() == ErrorClass::CredentialInvalid
    }
}
