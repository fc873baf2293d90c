//! Generation backend contract and error definitions.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use thiserror::Error;

/// Errors that can occur while calling a generation backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Transport-level failure (connect, read, decode).
    #[error("Backend request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Backend did not answer within the deadline.
    #[error("Backend timed out after {0} seconds")]
    Timeout(u64),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// A text-generation backend.
///
/// Output is untrusted: callers must redact it before returning it.
pub trait GenerationBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Generate a continuation of `prompt`.
    fn generate<'a>(&'a self, prompt: &'a str, max_new_tokens: u32)
        -> BoxFuture<'a, BackendResult<String>>;
}

/// Outcome of the startup capability probe.
#[derive(Clone)]
pub enum BackendCapability {
    /// A real backend answered the probe.
    Available(Arc<dyn GenerationBackend>),
    /// None configured, or the probe failed.
    Unavailable,
}

impl BackendCapability {
    pub fn is_available(&self) -> bool {
        matches!(self, BackendCapability::Available(_))
    }
}

impl std::fmt::Debug for BackendCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendCapability::Available(b) => {
                f.debug_tuple("Available").field(&b.name()).finish()
            }
            BackendCapability::Unavailable => f.write_str("Unavailable"),
        }
    }
}
