//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the prompt gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Credential set accepted by the identity gate.
    pub auth: AuthConfig,

    /// Token bucket parameters shared by the origin and credential limiters.
    pub rate_limit: RateLimitConfig,

    /// Daily quota accounting.
    pub quota: QuotaConfig,

    /// Prompt shape constraints (template, length, dedup).
    pub prompt: PromptConfig,

    /// Ordered disallowed-pattern rules. First match wins.
    pub rules: Vec<RuleConfig>,

    /// Output redaction settings.
    pub redaction: RedactionConfig,

    /// Generation backend settings.
    pub backend: BackendConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            auth: AuthConfig::default(),
            rate_limit: RateLimitConfig::default(),
            quota: QuotaConfig::default(),
            prompt: PromptConfig::default(),
            rules: RuleConfig::defaults(),
            redaction: RedactionConfig::default(),
            backend: BackendConfig::default(),
            timeouts: TimeoutConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Known credentials.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Accepted API keys.
    pub api_keys: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: demo credential. Override with GATEWAY_API_KEYS.
            api_keys: vec!["demo-key-123".to_string()],
        }
    }
}

/// Token bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Bucket capacity.
    pub burst: f64,

    /// Tokens added per minute.
    pub refill_per_minute: f64,

    /// Origin buckets idle for this long are evicted.
    pub origin_idle_ttl_secs: u64,

    /// How often the origin bucket sweeper runs.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 12.0,
            refill_per_minute: 6.0,
            origin_idle_ttl_secs: 3600,
            sweep_interval_secs: 300,
        }
    }
}

/// Daily quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Admissions per credential per window.
    pub daily_limit: u64,

    /// Window length in seconds.
    pub window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: 500,
            window_secs: 24 * 3600,
        }
    }
}

/// Prompt constraints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Maximum prompt length in characters.
    pub max_chars: usize,

    /// Literal prefixes a prompt must start with.
    pub approved_prefixes: Vec<String>,

    /// Fingerprint ring capacity.
    pub dedup_capacity: usize,

    /// Used when the request omits `max_new_tokens`.
    pub default_max_new_tokens: u32,

    /// Upper clamp for `max_new_tokens`.
    pub max_new_tokens_limit: u32,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_chars: 5000,
            approved_prefixes: ["Task:", "Question:", "User:", "Input:", "Query:"]
                .iter()
                .map(|p| p.to_string())
                .collect(),
            dedup_capacity: 4096,
            default_max_new_tokens: 128,
            max_new_tokens_limit: 1024,
        }
    }
}

/// A single disallowed-pattern rule.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RuleConfig {
    /// Identifier reported back to the caller on a match.
    pub id: String,

    /// Regular expression, matched case-insensitively.
    pub pattern: String,
}

impl RuleConfig {
    pub fn new(id: &str, pattern: &str) -> Self {
        Self {
            id: id.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// The built-in rule list, in evaluation order.
    pub fn defaults() -> Vec<RuleConfig> {
        vec![
            Self::new("override-trigger", r"\+\+OVERRIDE_POLICY\+\+"),
            Self::new("ignore-previous-instructions", r"ignore\s+previous\s+instructions"),
            Self::new("disregard-safety", r"disregard\s+safety"),
            Self::new("leak-api-key", r"leak\s+the\s*api\s*key"),
            Self::new("reveal-credentials", r"reveal\s+credentials?"),
            Self::new("exfiltrate-data", r"exfiltrat(e|ion)\s+data"),
            Self::new("disable-monitoring", r"disable\s+(logging|monitoring)"),
            Self::new("write-malware", r"write\s+malware"),
        ]
    }
}

/// Output redaction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// Replacement for every credential-shaped match.
    pub marker: String,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            marker: "[REDACTED_SECRET]".to_string(),
        }
    }
}

/// Generation backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Ollama-compatible base URL. `None` selects the placeholder backend.
    pub base_url: Option<String>,

    /// Model name sent with each generation request.
    pub model: String,

    /// Path probed once at startup.
    pub probe_path: String,

    /// Startup probe timeout in seconds.
    pub probe_timeout_secs: u64,

    /// Per-generation timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "distilgpt2".to_string(),
            probe_path: "/".to_string(),
            probe_timeout_secs: 2,
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
