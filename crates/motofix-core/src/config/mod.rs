//! Client configuration
//!
//! Configuration is resolved in three layers: built-in defaults, an optional
//! file (TOML, YAML or JSON by extension) and `MOTOFIX_*` environment variables.

mod env_loader;
mod file_loader;
pub mod model;

pub use env_loader::{apply_env_overrides, apply_overrides_from};
pub use file_loader::load_from_file;
pub use model::{
    ClientConfig, GeocoderConfig, HttpConfig, LoggingConfig, ServicesConfig, SessionConfig,
};

use crate::error::MotofixResult;
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "motofix.toml";

/// Load configuration from an optional file and apply environment overrides
pub fn load_config(path: Option<&Path>) -> MotofixResult<ClientConfig> {
    let mut config = match path {
        Some(path) => load_from_file(path)?,
        None => ClientConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    config.validate()?;
    tracing::debug!(
        auth = %config.services.auth_url,
        requests = %config.services.requests_url,
        "configuration loaded"
    );
    Ok(config)
}
