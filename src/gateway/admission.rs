//! The admission pipeline.
//!
//! # Responsibilities
//! - Run every gate in order and stop at the first rejection
//! - Dispatch admitted prompts to the generation backend under a deadline
//! - Redact backend output before it leaves the gateway
//! - Write one audit log line per rejection
//!
//! # Design Decisions
//! - Gates are owned stores, created at startup and dropped at shutdown
//! - Tokens and quota spent by a rejected request are not refunded
//! - A policy rejection never logs prompt content, only its length

use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::backend::GenerationBackend;
use crate::config::GatewayConfig;
use crate::gateway::types::{AdmissionStage, GatewayError, QueryRequest, QueryResponse};
use crate::observability::logging::excerpt;
use crate::observability::metrics;
use crate::resilience::timeouts::with_timeout;
use crate::screening::{
    normalize_text, ContentFilter, ContentRejection, DedupFilter, SecretRedactor,
    TemplateValidator,
};
use crate::security::{
    redact_key, Credential, IdentityGate, QuotaTracker, RateScope, TokenBucketLimiter,
};

/// Characters of prompt kept in audit logs.
const AUDIT_EXCERPT_CHARS: usize = 120;

/// Errors building a gateway from configuration.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no API keys configured")]
    NoCredentials,

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<ContentRejection> for GatewayError {
    fn from(rejection: ContentRejection) -> Self {
        match rejection {
            ContentRejection::Empty => GatewayError::EmptyPrompt,
            ContentRejection::TooLong { max_chars } => GatewayError::PromptTooLong { max_chars },
            ContentRejection::Policy { rule_id, pattern } => {
                GatewayError::PolicyViolation { rule_id, pattern }
            }
        }
    }
}

/// Progress of one request, kept for the audit log.
#[derive(Debug)]
struct Admission {
    stage: AdmissionStage,
    credential: Option<Credential>,
}

impl Admission {
    fn advance(&mut self, stage: AdmissionStage) {
        debug_assert!(stage > self.stage);
        self.stage = stage;
    }
}

/// Admission control in front of a generation backend.
pub struct Gateway {
    identity: IdentityGate,
    origin_limiter: TokenBucketLimiter<IpAddr>,
    credential_limiter: TokenBucketLimiter<Credential>,
    quota: QuotaTracker<Credential>,
    template: TemplateValidator,
    dedup: DedupFilter,
    content: ContentFilter,
    redactor: SecretRedactor,
    backend: Arc<dyn GenerationBackend>,
    backend_timeout_secs: u64,
    default_max_new_tokens: u32,
    max_new_tokens_limit: u32,
}

impl Gateway {
    /// Build every gate from a configuration that has passed
    /// [`validate_config`](crate::config::validation::validate_config).
    pub fn from_config(
        config: &GatewayConfig,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<Self, BuildError> {
        let identity = IdentityGate::new(&config.auth.api_keys);
        if identity.is_empty() {
            return Err(BuildError::NoCredentials);
        }

        let rate = &config.rate_limit;
        Ok(Self {
            identity,
            origin_limiter: TokenBucketLimiter::new(rate.burst, rate.refill_per_minute),
            credential_limiter: TokenBucketLimiter::new(rate.burst, rate.refill_per_minute),
            quota: QuotaTracker::new(
                config.quota.daily_limit,
                Duration::from_secs(config.quota.window_secs),
            ),
            template: TemplateValidator::new(config.prompt.approved_prefixes.iter().cloned()),
            dedup: DedupFilter::new(config.prompt.dedup_capacity),
            content: ContentFilter::new(&config.rules, config.prompt.max_chars)?,
            redactor: SecretRedactor::new(config.redaction.marker.clone())?,
            backend,
            backend_timeout_secs: config.backend.timeout_secs,
            default_max_new_tokens: config.prompt.default_max_new_tokens,
            max_new_tokens_limit: config.prompt.max_new_tokens_limit,
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn origin_limiter(&self) -> &TokenBucketLimiter<IpAddr> {
        &self.origin_limiter
    }

    pub fn quota(&self) -> &QuotaTracker<Credential> {
        &self.quota
    }

    /// Evict idle origin buckets. Returns how many were dropped.
    pub fn sweep_origins(&self, idle_ttl: Duration) -> usize {
        let evicted = self.origin_limiter.evict_idle(Instant::now(), idle_ttl);
        metrics::record_origin_buckets(self.origin_limiter.len());
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.origin_limiter.len(), "Evicted idle origin buckets");
        }
        evicted
    }

    /// Resolve the requested generation budget.
    pub fn max_new_tokens(&self, requested: Option<u32>) -> u32 {
        match requested {
            None | Some(0) => self.default_max_new_tokens,
            Some(n) => n.min(self.max_new_tokens_limit),
        }
    }

    /// Run one request through the pipeline.
    pub async fn handle(
        &self,
        origin: IpAddr,
        api_key: Option<&str>,
        request: QueryRequest,
    ) -> Result<QueryResponse, GatewayError> {
        let start_time = Instant::now();
        let mut admission = Admission {
            stage: AdmissionStage::Received,
            credential: None,
        };

        let result = self.run(origin, api_key, &request, &mut admission).await;

        match &result {
            Ok(_) => {
                metrics::record_admitted(start_time);
                tracing::debug!(
                    origin = %origin,
                    credential = ?admission.credential,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Request completed"
                );
            }
            Err(err) => {
                metrics::record_rejected(err.kind());
                self.audit_rejection(err, origin, api_key, &request.prompt, &admission);
            }
        }

        result
    }

    async fn run(
        &self,
        origin: IpAddr,
        api_key: Option<&str>,
        request: &QueryRequest,
        admission: &mut Admission,
    ) -> Result<QueryResponse, GatewayError> {
        let credential = self
            .identity
            .authenticate(api_key)
            .map_err(|_| GatewayError::Unauthenticated)?;
        admission.credential = Some(credential.clone());
        admission.advance(AdmissionStage::Authenticated);

        if !self.origin_limiter.check(&origin) {
            return Err(GatewayError::RateLimited(RateScope::Origin));
        }
        admission.advance(AdmissionStage::OriginRateOk);

        if !self.credential_limiter.check(&credential) {
            return Err(GatewayError::RateLimited(RateScope::Credential));
        }
        admission.advance(AdmissionStage::CredentialRateOk);

        self.quota
            .check_and_increment(&credential)
            .map_err(|_| GatewayError::QuotaExceeded)?;
        admission.advance(AdmissionStage::QuotaOk);

        let normalized = normalize_text(&request.prompt);
        admission.advance(AdmissionStage::Normalized);

        let prompt = self
            .template
            .validate(&normalized)
            .map_err(|v| GatewayError::TemplateViolation { detail: v.detail() })?;
        admission.advance(AdmissionStage::TemplateOk);

        self.dedup
            .check(prompt)
            .map_err(|_| GatewayError::DuplicateRejected)?;
        admission.advance(AdmissionStage::NotDuplicate);

        self.content.screen(prompt)?;
        admission.advance(AdmissionStage::ContentOk);

        let max_new_tokens = self.max_new_tokens(request.max_new_tokens);
        tracing::info!(
            origin = %origin,
            credential = %credential,
            max_new_tokens,
            prompt = %excerpt(prompt, AUDIT_EXCERPT_CHARS),
            "Request admitted"
        );

        let started = Instant::now();
        let output = with_timeout(
            self.backend_timeout_secs,
            self.backend.generate(prompt, max_new_tokens),
        )
        .await;
        metrics::record_backend_call(self.backend.name(), started, output.is_ok());
        let output = output.map_err(|e| {
            tracing::error!(backend = self.backend.name(), error = %e, "Generation failed");
            GatewayError::BackendUnavailable
        })?;
        admission.advance(AdmissionStage::Dispatched);

        let result = self.redactor.redact(&output).into_owned();
        admission.advance(AdmissionStage::Redacted);

        admission.advance(AdmissionStage::Completed);
        Ok(QueryResponse { result })
    }

    fn audit_rejection(
        &self,
        err: &GatewayError,
        origin: IpAddr,
        api_key: Option<&str>,
        prompt: &str,
        admission: &Admission,
    ) {
        let credential = match (&admission.credential, api_key) {
            (Some(c), _) => c.redacted(),
            (None, Some(raw)) if !raw.trim().is_empty() => redact_key(raw.trim()),
            _ => "-".to_string(),
        };

        if err.hides_prompt() {
            tracing::warn!(
                origin = %origin,
                credential = %credential,
                stage = ?admission.stage,
                kind = err.kind(),
                detail = %err,
                prompt_chars = prompt.chars().count(),
                "Request rejected"
            );
        } else {
            tracing::warn!(
                origin = %origin,
                credential = %credential,
                stage = ?admission.stage,
                kind = err.kind(),
                detail = %err,
                prompt = %excerpt(prompt, AUDIT_EXCERPT_CHARS),
                "Request rejected"
            );
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("credentials", &self.identity.len())
            .field("origin_buckets", &self.origin_limiter.len())
            .field("backend", &self.backend.name())
            .finish()
    }
}
