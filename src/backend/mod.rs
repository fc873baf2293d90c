//! Generation backend subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     BackendConfig → negotiate() → probe once
//!         → Available(OllamaBackend) | Unavailable
//!     → resolve() → Arc<dyn GenerationBackend> (placeholder if unavailable)
//!
//! Per request:
//!     Gateway → resilience::timeouts → GenerationBackend::generate
//! ```
//!
//! # Design Decisions
//! - Capability is decided once; a failed probe is never retried per request
//! - The backend is an external collaborator: only its call contract matters

pub mod ollama;
pub mod placeholder;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

pub use ollama::OllamaBackend;
pub use placeholder::PlaceholderBackend;
pub use types::{BackendCapability, BackendError, BackendResult, GenerationBackend};

use crate::config::BackendConfig;

/// Probe the configured backend once.
pub async fn negotiate(config: &BackendConfig) -> BackendCapability {
    let Some(backend) = OllamaBackend::from_config(config) else {
        tracing::info!("No generation backend configured, using placeholder responses");
        return BackendCapability::Unavailable;
    };

    let timeout = Duration::from_secs(config.probe_timeout_secs);
    match backend.probe(&config.probe_path, timeout).await {
        Ok(()) => {
            tracing::info!(base_url = %backend.base_url(), model = %config.model, "Generation backend available");
            BackendCapability::Available(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!(
                base_url = %backend.base_url(),
                error = %e,
                "Generation backend unreachable, falling back to placeholder responses"
            );
            BackendCapability::Unavailable
        }
    }
}

impl BackendCapability {
    /// The backend to dispatch to for the process lifetime.
    pub fn resolve(self) -> Arc<dyn GenerationBackend> {
        match self {
            BackendCapability::Available(backend) => backend,
            BackendCapability::Unavailable => Arc::new(PlaceholderBackend),
        }
    }
}
