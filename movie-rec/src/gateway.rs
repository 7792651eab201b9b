use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{RecError, Result};

/// One text-generation backend: accepts a prompt, returns text, may fail.
/// Implementations should map any transport or non-success condition to
/// `RecError::Transport`.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name for logging
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Ordered provider chain. Providers are tried sequentially; the first
/// success wins. When every provider fails the gateway reports
/// `GenerationUnavailable` carrying the last provider's error message so
/// callers can surface it next to fallback output.
pub struct GenerationGateway {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl GenerationGateway {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.generate(prompt).await {
                Ok(text) => {
                    info!(
                        provider = provider.name(),
                        response_length = text.len(),
                        "Generation succeeded"
                    );
                    return Ok(text);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e.to_string());
                }
            }
        }

        Err(RecError::GenerationUnavailable(last_error.unwrap_or_else(
            || "no completion providers configured".to_string(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Ok(self.reply.to_string())
        }
    }

    struct FailingProvider {
        name: &'static str,
    }

    #[async_trait]
    impl CompletionProvider for FailingProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            Err(RecError::Transport(format!("{} is down", self.name)))
        }
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let gateway = GenerationGateway::new(vec![
            Arc::new(FixedProvider { name: "primary", reply: "from primary" }),
            Arc::new(FixedProvider { name: "secondary", reply: "from secondary" }),
        ]);
        let text = gateway.generate("prompt").await.unwrap();
        assert_eq!(text, "from primary");
    }

    #[tokio::test]
    async fn fallback_provider_used_when_primary_fails() {
        let gateway = GenerationGateway::new(vec![
            Arc::new(FailingProvider { name: "primary" }),
            Arc::new(FixedProvider { name: "secondary", reply: "from secondary" }),
        ]);
        let text = gateway.generate("prompt").await.unwrap();
        assert_eq!(text, "from secondary");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_generation_unavailable() {
        let gateway = GenerationGateway::new(vec![
            Arc::new(FailingProvider { name: "primary" }),
            Arc::new(FailingProvider { name: "secondary" }),
        ]);
        let err = gateway.generate("prompt").await.unwrap_err();
        match err {
            RecError::GenerationUnavailable(msg) => {
                assert!(msg.contains("secondary is down"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn single_provider_failure_propagates_without_fallback() {
        let gateway = GenerationGateway::new(vec![Arc::new(FailingProvider { name: "primary" })
            as Arc<dyn CompletionProvider>]);
        let err = gateway.generate("prompt").await.unwrap_err();
        assert!(matches!(err, RecError::GenerationUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let gateway = GenerationGateway::new(vec![]);
        let err = gateway.generate("prompt").await.unwrap_err();
        assert!(matches!(err, RecError::GenerationUnavailable(_)));
    }
}
