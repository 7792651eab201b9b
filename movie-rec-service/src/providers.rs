//! Completion provider adapters for the generation gateway.
//!
//! Each adapter is a thin HTTP client: it posts the prompt, maps any
//! transport or non-success condition to `RecError::Transport`, and
//! returns the generated text. Ordering and fallback between adapters is
//! the gateway's concern.

use async_trait::async_trait;
use movie_rec::{CompletionProvider, RecError, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Adapter for a local Ollama instance
pub struct OllamaProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(client: reqwest::Client, base_url: String, model: String) -> Self {
        Self {
            client,
            base_url,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&OllamaGenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| RecError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecError::Transport(format!(
                "Ollama returned status {status}: {body}"
            )));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| RecError::Transport(format!("invalid Ollama response: {e}")))?;
        Ok(body.response)
    }
}

/// Adapter for the Together.ai completions API
pub struct TogetherProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct TogetherCompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize)]
struct TogetherCompletionResponse {
    choices: Vec<TogetherChoice>,
}

#[derive(Deserialize)]
struct TogetherChoice {
    text: String,
}

impl TogetherProvider {
    pub fn new(client: reqwest::Client, api_url: String, api_key: String, model: String) -> Self {
        Self {
            client,
            api_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl CompletionProvider for TogetherProvider {
    fn name(&self) -> &'static str {
        "together"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&TogetherCompletionRequest {
                model: &self.model,
                prompt,
                max_tokens: 1024,
                temperature: 0.7,
                top_p: 0.8,
            })
            .send()
            .await
            .map_err(|e| RecError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RecError::Transport(format!(
                "Together.ai returned status {status}: {body}"
            )));
        }

        let body: TogetherCompletionResponse = response
            .json()
            .await
            .map_err(|e| RecError::Transport(format!("invalid Together.ai response: {e}")))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| RecError::Transport("Together.ai returned no choices".to_string()))
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Tag names carry an implicit `:latest` suffix, so compare both verbatim
/// and up to the first colon
fn tag_matches(tag: &str, model: &str) -> bool {
    tag == model || tag.split(':').next() == Some(model)
}

/// Startup health check: verifies the configured model is present on the
/// Ollama instance and attempts one pull when it isn't. Every failure is
/// logged and swallowed; the service keeps running in degraded mode and
/// relies on the gateway's per-request fallback policy.
pub async fn ensure_model_available(client: &reqwest::Client, base_url: &str, model: &str) {
    let tags_url = format!("{base_url}/api/tags");
    let response = match client.get(&tags_url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Ollama service is not available, continuing in degraded mode");
            return;
        }
    };

    let tags: TagsResponse = match response.json().await {
        Ok(tags) => tags,
        Err(e) => {
            warn!(error = %e, "Could not read Ollama model list, continuing in degraded mode");
            return;
        }
    };

    if tags.models.iter().any(|m| tag_matches(&m.name, model)) {
        info!(model, "Ollama is running with the required model");
        return;
    }

    let available: Vec<&str> = tags.models.iter().map(|m| m.name.as_str()).collect();
    warn!(
        model,
        available = available.join(", "),
        "Configured model not available, attempting to pull"
    );

    let pull_url = format!("{base_url}/api/pull");
    match client
        .post(&pull_url)
        .json(&serde_json::json!({ "name": model }))
        .send()
        .await
    {
        Ok(response) if response.status().is_success() => {
            info!(model, "Model pulled successfully");
        }
        Ok(response) => {
            warn!(
                model,
                status = %response.status(),
                "Failed to pull model, continuing in degraded mode"
            );
        }
        Err(e) => {
            warn!(model, error = %e, "Failed to pull model, continuing in degraded mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ollama_request_body_shape() {
        let body = OllamaGenerateRequest {
            model: "llama3.2",
            prompt: "recommend something",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "llama3.2", "prompt": "recommend something", "stream": false})
        );
    }

    #[test]
    fn together_request_carries_sampling_parameters() {
        let body = TogetherCompletionRequest {
            model: "mistralai/Mistral-7B-Instruct-v0.1",
            prompt: "p",
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.8,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["max_tokens"], 1024);
        assert_eq!(json["temperature"], 0.7);
    }

    #[test]
    fn together_response_takes_first_choice() {
        let json = r#"{"choices": [{"text": "first"}, {"text": "second"}]}"#;
        let response: TogetherCompletionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].text, "first");
    }

    #[test]
    fn tags_response_tolerates_missing_models_field() {
        let tags: TagsResponse = serde_json::from_str("{}").unwrap();
        assert!(tags.models.is_empty());
    }

    #[test]
    fn tag_matching_handles_latest_suffix() {
        assert!(tag_matches("llama3.2", "llama3.2"));
        assert!(tag_matches("llama3.2:latest", "llama3.2"));
        assert!(!tag_matches("llama3.1:latest", "llama3.2"));
    }
}
