//! Startup orchestration.
//!
//! # Responsibilities
//! - Negotiate the generation backend once
//! - Build the admission pipeline from a validated configuration
//!
//! # Design Decisions
//! - Backend unavailability is not fatal: the placeholder answers instead
//! - A configuration that cannot build a pipeline is fatal

use std::sync::Arc;

use thiserror::Error;

use crate::backend;
use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::{BuildError, Gateway};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build admission pipeline: {0}")]
    Build(#[from] BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

/// Probe the backend and assemble the gateway.
pub async fn build_gateway(config: &GatewayConfig) -> Result<Arc<Gateway>, StartupError> {
    let capability = backend::negotiate(&config.backend).await;
    let gateway = Gateway::from_config(config, capability.resolve())?;

    tracing::info!(
        credentials = config.auth.api_keys.len(),
        rules = config.rules.len(),
        daily_limit = config.quota.daily_limit,
        burst = config.rate_limit.burst,
        refill_per_minute = config.rate_limit.refill_per_minute,
        backend = gateway.backend_name(),
        "Admission pipeline ready"
    );

    Ok(Arc::new(gateway))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_with_placeholder() {
        let gateway = build_gateway(&GatewayConfig::default()).await.unwrap();
        assert_eq!(gateway.backend_name(), "placeholder");
    }

    #[tokio::test]
    async fn test_build_rejects_empty_credentials() {
        let mut config = GatewayConfig::default();
        config.auth.api_keys.clear();
        let err = build_gateway(&config).await.unwrap_err();
        assert!(matches!(err, StartupError::Build(BuildError::NoCredentials)));
    }
}
