//! Request, response and rejection types for the admission pipeline.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::security::RateScope;

/// Body of `POST /query`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryRequest {
    pub prompt: String,
    #[serde(default)]
    pub max_new_tokens: Option<u32>,
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens: None,
        }
    }
}

/// Successful `POST /query` response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct QueryResponse {
    pub result: String,
}

/// Pipeline position of a request. Each variant is reached by passing the
/// gate named in its doc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AdmissionStage {
    Received,
    /// Identity gate.
    Authenticated,
    /// Origin token bucket.
    OriginRateOk,
    /// Credential token bucket.
    CredentialRateOk,
    /// Daily quota.
    QuotaOk,
    /// Text normalizer.
    Normalized,
    /// Template validator.
    TemplateOk,
    /// Dedup filter.
    NotDuplicate,
    /// Content filter.
    ContentOk,
    /// Backend call returned.
    Dispatched,
    /// Secret redactor.
    Redacted,
    Completed,
}

/// Terminal rejection of a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Missing or invalid API key.")]
    Unauthenticated,

    #[error("{}", rate_limited_detail(.0))]
    RateLimited(RateScope),

    #[error("Daily quota exceeded for this API key.")]
    QuotaExceeded,

    #[error("Blocked: Empty prompt.")]
    EmptyPrompt,

    #[error("Blocked: Prompt too long (>{max_chars} chars).")]
    PromptTooLong { max_chars: usize },

    #[error("{detail}")]
    TemplateViolation { detail: String },

    #[error("Duplicate/near-duplicate prompt throttled.")]
    DuplicateRejected,

    #[error("Blocked by rule {rule_id}: /{pattern}/")]
    PolicyViolation { rule_id: String, pattern: String },

    #[error("Generation backend unavailable.")]
    BackendUnavailable,
}

fn rate_limited_detail(scope: &RateScope) -> &'static str {
    match scope {
        RateScope::Origin => "IP rate limit exceeded.",
        RateScope::Credential => "API key rate limit exceeded.",
    }
}

impl GatewayError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unauthenticated => "unauthenticated",
            GatewayError::RateLimited(RateScope::Origin) => "rate_limited_origin",
            GatewayError::RateLimited(RateScope::Credential) => "rate_limited_credential",
            GatewayError::QuotaExceeded => "quota_exceeded",
            GatewayError::EmptyPrompt => "empty_prompt",
            GatewayError::PromptTooLong { .. } => "prompt_too_long",
            GatewayError::TemplateViolation { .. } => "template_violation",
            GatewayError::DuplicateRejected => "duplicate_rejected",
            GatewayError::PolicyViolation { .. } => "policy_violation",
            GatewayError::BackendUnavailable => "backend_unavailable",
        }
    }

    /// HTTP status code for this rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Unauthenticated => 401,
            GatewayError::RateLimited(_)
            | GatewayError::QuotaExceeded
            | GatewayError::DuplicateRejected => 429,
            GatewayError::EmptyPrompt
            | GatewayError::PromptTooLong { .. }
            | GatewayError::TemplateViolation { .. }
            | GatewayError::PolicyViolation { .. } => 400,
            GatewayError::BackendUnavailable => 503,
        }
    }

    /// Whether the prompt matched filtered content and must stay out of logs.
    pub fn hides_prompt(&self) -> bool {
        matches!(self, GatewayError::PolicyViolation { .. })
    }
}
