//! Security subsystem: who may call, how often, and how much.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → identity.rs (X-API-Key against the credential set)
//!     → rate_limit.rs (origin bucket, then credential bucket)
//!     → quota.rs (daily admissions per credential)
//!     → Pass to screening
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any security check failure
//! - Tokens and quota consumed by a request are never refunded, even if a
//!   later gate rejects it
//! - All state is process-local; stores are owned by the gateway, not global

pub mod identity;
pub mod quota;
pub mod rate_limit;

pub use identity::{redact_key, Credential, IdentityGate, Unauthenticated, API_KEY_HEADER};
pub use quota::{QuotaExceeded, QuotaTracker};
pub use rate_limit::{RateScope, TokenBucketLimiter};
