//! Content screening subsystem.
//!
//! # Data Flow
//! ```text
//! Raw prompt:
//!     → normalize.rs (NFKC, strip non-printables)
//!     → template.rs (approved prefix)
//!     → dedup.rs (fingerprint ring)
//!     → content.rs (length, disallowed patterns)
//!     → [backend]
//!     → redact.rs (mask secrets in output)
//! ```
//!
//! # Design Decisions
//! - Everything but the dedup ring is pure and shareable without locks
//! - Pattern lists are configuration, never code paths
//! - Detection is best-effort pattern matching, not a security boundary

pub mod content;
pub mod dedup;
pub mod normalize;
pub mod redact;
pub mod template;

pub use content::{ContentFilter, ContentRejection, Rule};
pub use dedup::{DedupFilter, DuplicateRejected};
pub use normalize::normalize_text;
pub use redact::SecretRedactor;
pub use template::{TemplateValidator, TemplateViolation};
