//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap backend calls with a deadline
//! - Cancel the call cleanly on expiry
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other backend errors
//! - Expiry only drops the in-flight call; admission state is untouched

use std::future::Future;
use std::time::Duration;

use crate::backend::{BackendError, BackendResult};

/// Run `call`, failing with [`BackendError::Timeout`] after `secs` seconds.
pub async fn with_timeout<T, F>(secs: u64, call: F) -> BackendResult<T>
where
    F: Future<Output = BackendResult<T>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), call).await {
        Ok(result) => result,
        Err(_) => Err(BackendError::Timeout(secs)),
    }
}
