//! Fallback backend used when no real backend is available.

use futures_util::future::BoxFuture;

use crate::backend::types::{BackendResult, GenerationBackend};

/// Echoes the prompt with a fixed moderation notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderBackend;

impl PlaceholderBackend {
    pub fn respond(prompt: &str) -> String {
        format!("{prompt}\n\n[Mock LLM]: This response was moderated and generated safely.")
    }
}

impl GenerationBackend for PlaceholderBackend {
    fn name(&self) -> &'static str {
        "placeholder"
    }

    fn generate<'a>(
        &'a self,
        prompt: &'a str,
        _max_new_tokens: u32,
    ) -> BoxFuture<'a, BackendResult<String>> {
        Box::pin(async move { Ok(Self::respond(prompt)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_placeholder_echoes_prompt() {
        let out = PlaceholderBackend.generate("Task: hi", 16).await.unwrap();
        assert!(out.starts_with("Task: hi\n\n[Mock LLM]"));
    }
}
