//! Admission orchestration.
//!
//! # State Machine
//! ```text
//! Received → Authenticated → OriginRateOk → CredentialRateOk → QuotaOk
//!     → Normalized → TemplateOk → NotDuplicate → ContentOk
//!     → Dispatched → Redacted → Completed
//!
//! Any gate failure → Rejected{kind, detail} (terminal)
//! ```

pub mod admission;
pub mod types;

pub use admission::{BuildError, Gateway};
pub use types::{AdmissionStage, GatewayError, QueryRequest, QueryResponse};
