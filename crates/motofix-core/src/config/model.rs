//! Configuration data model

use crate::error::{MotofixError, MotofixResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    pub services: ServicesConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub geocoder: GeocoderConfig,
    pub logging: LoggingConfig,
}

/// Base URLs of the remote microservices
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServicesConfig {
    /// Auth service (OTP issue/exchange, token verification)
    pub auth_url: String,
    /// Requests service (breakdown requests and their status)
    pub requests_url: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            auth_url: "http://localhost:8001".to_string(),
            requests_url: "http://localhost:8002".to_string(),
        }
    }
}

/// Outbound HTTP settings shared by all API clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: concat!("motofix-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Session persistence and verification policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Directory holding the persisted token and user record.
    /// `None` resolves to `~/.motofix/session`.
    pub storage_dir: Option<PathBuf>,
    /// Retries after the first failed verification attempt (transient errors only)
    pub verify_retries: u32,
    /// Fixed delay between verification attempts
    #[serde(with = "humantime_serde")]
    pub verify_retry_delay: Duration,
    /// Country calling code used to normalize local phone numbers
    pub default_country_code: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            verify_retries: 2,
            verify_retry_delay: Duration::from_secs(1),
            default_country_code: "256".to_string(),
        }
    }
}

impl SessionConfig {
    /// Resolve the storage directory, falling back to the home directory
    pub fn resolved_storage_dir(&self) -> MotofixResult<PathBuf> {
        match &self.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(".motofix").join("session"))
                .ok_or_else(|| MotofixError::config("Cannot find home directory")),
        }
    }
}

/// Reverse-geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeocoderConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Minimum spacing between the start of two outbound calls
    #[serde(with = "humantime_serde")]
    pub min_interval: Duration,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            min_interval: Duration::from_secs(1),
        }
    }
}

/// Logging settings consumed by the CLI when installing the subscriber
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
        }
    }
}

impl ClientConfig {
    /// Validate the configuration
    pub fn validate(&self) -> MotofixResult<()> {
        check_url("services.auth_url", &self.services.auth_url)?;
        check_url("services.requests_url", &self.services.requests_url)?;
        if self.geocoder.enabled {
            check_url("geocoder.base_url", &self.geocoder.base_url)?;
        }

        if self.http.timeout.is_zero() {
            return Err(MotofixError::config("http.timeout must be greater than zero"));
        }

        if self.session.verify_retries > 0 && self.session.verify_retry_delay.is_zero() {
            return Err(MotofixError::config(
                "session.verify_retry_delay must be non-zero when retries are enabled",
            ));
        }

        if self.session.default_country_code.is_empty()
            || !self
                .session
                .default_country_code
                .chars()
                .all(|c| c.is_ascii_digit())
        {
            return Err(MotofixError::config(format!(
                "session.default_country_code must be digits, got '{}'",
                self.session.default_country_code
            )));
        }

        Ok(())
    }
}

fn check_url(field: &str, value: &str) -> MotofixResult<()> {
    let url = reqwest::Url::parse(value).map_err(|e| {
        MotofixError::config_with_context(format!("Invalid URL '{}': {}", value, e), field)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MotofixError::config_with_context(
            format!("Unsupported URL scheme '{}'", other),
            field,
        )),
    }
}
