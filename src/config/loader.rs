//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Comma-separated list of accepted API keys.
pub const ENV_API_KEYS: &str = "GATEWAY_API_KEYS";
/// Per-credential daily admission limit.
pub const ENV_DAILY_QUOTA: &str = "GATEWAY_DAILY_QUOTA";
pub const ENV_BIND_ADDRESS: &str = "GATEWAY_BIND_ADDRESS";
pub const ENV_BACKEND_URL: &str = "GATEWAY_BACKEND_URL";
pub const ENV_LOG_LEVEL: &str = "GATEWAY_LOG_LEVEL";
/// Path to a TOML config file, used when no path is given explicitly.
pub const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: GatewayConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build the startup configuration: file (if any), then environment
/// overrides, then validation.
pub fn load_startup_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let env_path = std::env::var(ENV_CONFIG_PATH).ok();
    let path = path.or(env_path.as_deref().map(Path::new));

    let mut config: GatewayConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides using the given variable lookup.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(keys) = lookup(ENV_API_KEYS) {
        config.auth.api_keys = keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(String::from)
            .collect();
    }

    if let Some(raw) = lookup(ENV_DAILY_QUOTA) {
        config.quota.daily_limit = raw.trim().parse().map_err(|_| ConfigError::Env {
            var: ENV_DAILY_QUOTA,
            value: raw.clone(),
        })?;
    }

    if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }

    if let Some(url) = lookup(ENV_BACKEND_URL) {
        config.backend.base_url = Some(url).filter(|u| !u.trim().is_empty());
    }

    if let Some(level) = lookup(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }

    Ok(())
}
