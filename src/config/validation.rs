//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (burst >= 1, limits > 0)
//! - Compile rule patterns so a bad pattern fails startup, not a request
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use regex::RegexBuilder;
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("auth.api_keys must contain at least one non-empty key")]
    NoCredentials,

    #[error("listener.bind_address '{0}' is not a socket address")]
    BindAddress(String),

    #[error("{field} must be {requirement}")]
    OutOfRange {
        field: &'static str,
        requirement: &'static str,
    },

    #[error("prompt.approved_prefixes must not be empty")]
    NoPrefixes,

    #[error("rule '{id}' has an invalid pattern: {reason}")]
    RulePattern { id: String, reason: String },

    #[error("rule id '{0}' is declared more than once")]
    DuplicateRule(String),

    #[error("backend.base_url '{0}' is not a valid URL")]
    BackendUrl(String),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.auth.api_keys.iter().any(|k| !k.trim().is_empty()) {
        errors.push(ValidationError::NoCredentials);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let ranges = [
        (
            config.rate_limit.burst.is_finite() && config.rate_limit.burst >= 1.0,
            "rate_limit.burst",
            "a finite number >= 1",
        ),
        (
            config.rate_limit.refill_per_minute.is_finite()
                && config.rate_limit.refill_per_minute > 0.0,
            "rate_limit.refill_per_minute",
            "a finite number > 0",
        ),
        (
            config.rate_limit.sweep_interval_secs > 0,
            "rate_limit.sweep_interval_secs",
            "greater than 0",
        ),
        (config.quota.daily_limit > 0, "quota.daily_limit", "greater than 0"),
        (config.quota.window_secs > 0, "quota.window_secs", "greater than 0"),
        (config.prompt.max_chars > 0, "prompt.max_chars", "greater than 0"),
        (
            config.prompt.dedup_capacity > 0,
            "prompt.dedup_capacity",
            "greater than 0",
        ),
        (
            config.prompt.default_max_new_tokens > 0
                && config.prompt.default_max_new_tokens <= config.prompt.max_new_tokens_limit,
            "prompt.default_max_new_tokens",
            "between 1 and prompt.max_new_tokens_limit",
        ),
        (
            config.backend.timeout_secs > 0,
            "backend.timeout_secs",
            "greater than 0",
        ),
        (
            config.timeouts.request_secs > 0,
            "timeouts.request_secs",
            "greater than 0",
        ),
    ];
    for (ok, field, requirement) in ranges {
        if !ok {
            errors.push(ValidationError::OutOfRange { field, requirement });
        }
    }

    if config.prompt.approved_prefixes.iter().all(|p| p.is_empty()) {
        errors.push(ValidationError::NoPrefixes);
    }

    let mut seen = HashSet::new();
    for rule in &config.rules {
        if !seen.insert(rule.id.as_str()) {
            errors.push(ValidationError::DuplicateRule(rule.id.clone()));
        }
        if let Err(e) = RegexBuilder::new(&rule.pattern)
            .case_insensitive(true)
            .build()
        {
            errors.push(ValidationError::RulePattern {
                id: rule.id.clone(),
                reason: e.to_string(),
            });
        }
    }

    if let Some(base_url) = &config.backend.base_url {
        if Url::parse(base_url).is_err() {
            errors.push(ValidationError::BackendUrl(base_url.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RuleConfig;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&GatewayConfig::default()), Ok(()));
    }

    #[test]
    fn test_empty_credentials_rejected() {
        let mut config = GatewayConfig::default();
        config.auth.api_keys = vec!["  ".to_string()];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::NoCredentials));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.rate_limit.burst = 0.5;
        config.quota.daily_limit = 0;
        config.listener.bind_address = "not-an-address".into();
        config.rules.push(RuleConfig::new("broken", "(unclosed"));
        config.rules.push(RuleConfig::new("write-malware", "again"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5, "{errors:?}");
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::RulePattern { id, .. } if id == "broken")));
        assert!(errors.contains(&ValidationError::DuplicateRule("write-malware".into())));
    }

    #[test]
    fn test_backend_url_checked() {
        let mut config = GatewayConfig::default();
        config.backend.base_url = Some("::nope::".into());
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::BackendUrl("::nope::".into())]);
    }
}
