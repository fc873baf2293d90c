//! Ollama-compatible HTTP generation backend.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::backend::types::{BackendError, BackendResult, GenerationBackend};
use crate::config::BackendConfig;

// Ollama API request format
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
}

// Ollama API response format
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Calls `POST {base_url}/api/generate` with streaming disabled.
#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: reqwest::Client,
    base_url: Url,
    model: String,
}

impl OllamaBackend {
    pub fn new(base_url: Url, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model: model.into(),
        }
    }

    /// Build from configuration. `None` when no base URL is set or it does
    /// not parse.
    pub fn from_config(config: &BackendConfig) -> Option<Self> {
        let base_url = Url::parse(config.base_url.as_deref()?).ok()?;
        Some(Self::new(base_url, config.model.clone()))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// One-shot reachability check used during capability negotiation.
    pub async fn probe(&self, path: &str, timeout: Duration) -> BackendResult<()> {
        let res = self
            .client
            .get(self.endpoint(path))
            .timeout(timeout)
            .send()
            .await?;
        if res.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Status(res.status().as_u16()))
        }
    }
}

impl GenerationBackend for OllamaBackend {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        max_new_tokens: u32,
    ) -> BoxFuture<'a, BackendResult<String>> {
        Box::pin(async move {
            let body = GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    num_predict: max_new_tokens,
                },
            };

            let res = self
                .client
                .post(self.endpoint("api/generate"))
                .json(&body)
                .send()
                .await?;

            if !res.status().is_success() {
                return Err(BackendError::Status(res.status().as_u16()));
            }

            let parsed: GenerateResponse = res.json().await?;
            Ok(parsed.response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_cleanly() {
        let backend = OllamaBackend::new(Url::parse("http://localhost:11434/").unwrap(), "m");
        assert_eq!(backend.endpoint("/api/generate"), "http://localhost:11434/api/generate");
        assert_eq!(backend.endpoint("/"), "http://localhost:11434/");
    }

    #[test]
    fn test_from_config_requires_url() {
        let mut config = BackendConfig::default();
        assert!(OllamaBackend::from_config(&config).is_none());
        config.base_url = Some("http://127.0.0.1:11434".into());
        let backend = OllamaBackend::from_config(&config).unwrap();
        assert_eq!(backend.model, "distilgpt2");
    }

    #[test]
    fn test_request_shape() {
        let body = GenerateRequest {
            model: "m",
            prompt: "Task: x",
            stream: false,
            options: GenerateOptions { num_predict: 64 },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "m",
                "prompt": "Task: x",
                "stream": false,
                "options": { "num_predict": 64 }
            })
        );
    }
}
