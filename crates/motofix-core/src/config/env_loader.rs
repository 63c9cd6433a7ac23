//! Environment variable overrides
//!
//! Recognized variables:
//! - `MOTOFIX_AUTH_URL`, `MOTOFIX_REQUESTS_URL`
//! - `MOTOFIX_GEOCODER_URL`, `MOTOFIX_GEOCODER_ENABLED`
//! - `MOTOFIX_SESSION_DIR`, `MOTOFIX_COUNTRY_CODE`
//! - `MOTOFIX_VERIFY_RETRIES`, `MOTOFIX_HTTP_TIMEOUT` (humantime, e.g. `10s`)
//! - `MOTOFIX_LOG_LEVEL`

use super::model::ClientConfig;
use crate::error::{MotofixError, MotofixResult};
use std::env;
use std::path::PathBuf;

/// Apply overrides from the process environment
pub fn apply_env_overrides(config: &mut ClientConfig) -> MotofixResult<()> {
    apply_overrides_from(config, |key| env::var(key).ok())
}

/// Apply overrides from an arbitrary variable lookup
pub fn apply_overrides_from<F>(config: &mut ClientConfig, lookup: F) -> MotofixResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("MOTOFIX_AUTH_URL") {
        config.services.auth_url = url;
    }
    if let Some(url) = lookup("MOTOFIX_REQUESTS_URL") {
        config.services.requests_url = url;
    }
    if let Some(url) = lookup("MOTOFIX_GEOCODER_URL") {
        config.geocoder.base_url = url;
    }
    if let Some(enabled) = lookup("MOTOFIX_GEOCODER_ENABLED") {
        config.geocoder.enabled = parse_bool(&enabled)
            .ok_or_else(|| MotofixError::config("Invalid MOTOFIX_GEOCODER_ENABLED value"))?;
    }
    if let Some(dir) = lookup("MOTOFIX_SESSION_DIR") {
        config.session.storage_dir = Some(PathBuf::from(dir));
    }
    if let Some(code) = lookup("MOTOFIX_COUNTRY_CODE") {
        config.session.default_country_code = code.trim_start_matches('+').to_string();
    }
    if let Some(retries) = lookup("MOTOFIX_VERIFY_RETRIES") {
        config.session.verify_retries = retries
            .parse()
            .map_err(|_| MotofixError::config("Invalid MOTOFIX_VERIFY_RETRIES value"))?;
    }
    if let Some(timeout) = lookup("MOTOFIX_HTTP_TIMEOUT") {
        config.http.timeout = humantime_serde::re::humantime::parse_duration(&timeout)
            .map_err(|e| MotofixError::config(format!("Invalid MOTOFIX_HTTP_TIMEOUT: {}", e)))?;
    }
    if let Some(level) = lookup("MOTOFIX_LOG_LEVEL") {
        config.logging.level = level;
    }
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
