//! Prompt admission gateway library.
//!
//! Every `/query` request passes a fixed sequence of gates before it
//! reaches the generation backend, and the generated text is scrubbed of
//! credential-shaped substrings before it is returned.

// Admission pipeline
pub mod gateway;
pub mod screening;
pub mod security;

// Collaborators
pub mod backend;
pub mod http;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::GatewayConfig;
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
