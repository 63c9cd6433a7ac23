//! Core error types

use thiserror::Error;

/// Result type alias for Motofix client operations
pub type MotofixResult<T> = Result<T, MotofixError>;

/// Main error type for the Motofix client
#[derive(Error, Debug, Clone)]
pub enum MotofixError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// The server rejected our credentials (HTTP 401)
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String, url: Option<String> },

    /// Rejected input, either by the server (4xx) or by local form validation
    #[error("Validation failed: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        status_code: Option<u16>,
    },

    /// Non-success HTTP response not covered by a more specific variant
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        url: Option<String>,
        status_code: Option<u16>,
    },

    /// The remote host could not be reached
    #[error("Network error: {message}")]
    Network { message: String, url: Option<String> },

    /// The request did not complete in time
    #[error("Request timed out: {message}")]
    Timeout { message: String, url: Option<String> },

    /// Session persistence errors
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        path: Option<String>,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        context: Option<String>,
    },

    /// Local IO errors (reading attachments, config files)
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Operation was cancelled by the caller
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("Error: {message}")]
    Other { message: String },
}

impl From<std::io::Error> for MotofixError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            path: None,
        }
    }
}

impl From<serde_json::Error> for MotofixError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
            context: None,
        }
    }
}

impl From<reqwest::Error> for MotofixError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());
        if err.is_timeout() {
            Self::Timeout {
                message: err.to_string(),
                url,
            }
        } else if err.is_connect() || err.is_request() {
            Self::Network {
                message: err.to_string(),
                url,
            }
        } else if err.is_decode() {
            Self::Json {
                message: err.to_string(),
                context: url.map(|u| format!("Decoding response from {}", u)),
            }
        } else if let Some(status) = err.status() {
            Self::from_status(status.as_u16(), err.to_string(), url)
        } else {
            Self::Network {
                message: err.to_string(),
                url,
            }
        }
    }
}
