//! Resilience around the generation backend.
//!
//! # Design Decisions
//! - Every backend call is bounded by a timeout
//! - No retries: a failed generation surfaces as `BackendUnavailable`

pub mod timeouts;
