//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, timeout, body limit)
//!     → request.rs (origin address, X-API-Key)
//!     → gateway::Gateway::handle (admission pipeline)
//!     → response.rs (rejection → status + {"detail": ...})
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use response::ErrorBody;
pub use server::{AppState, HttpServer};
