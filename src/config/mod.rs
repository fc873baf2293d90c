//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (GATEWAY_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to Gateway::from_config at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_startup_config, ConfigError};
pub use schema::{
    AuthConfig, BackendConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, PromptConfig,
    QuotaConfig, RateLimitConfig, RedactionConfig, RuleConfig, TimeoutConfig,
};
pub use validation::ValidationError;
