//! OpenAI-compatible chat-completion client

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

use super::{ChatClient, LlmConfig};
use crate::error::EvalError;

/// Client for `POST {base_url}/chat/completions`
pub struct OpenAiClient {
    config: LlmConfig,
    http_client: Client,
}

impl OpenAiClient {
    /// Create a new client
    pub fn new(config: LlmConfig) -> Result<Self, EvalError> {
        if config.api_key.is_none() {
            return Err(EvalError::config(
                "No API key configured for the chat-completion client (set OPENAI_API_KEY)",
            ));
        }
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Model this client sends requests for
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn request_body(&self, system: &str, user: &str) -> Value {
        json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": self.config.temperature,
        })
    }
}

/// Extract the trimmed text of the first choice
fn parse_completion(response: &Value) -> Result<String> {
    response["choices"]
        .as_array()
        .and_then(|choices| choices.first())
        .and_then(|choice| choice["message"]["content"].as_str())
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow!("Chat completion response has no message content"))
}

#[async_trait]
impl ChatClient for OpenAiClient {
    #[instrument(skip(self, system, user), fields(model = %self.config.model), level = "debug")]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let mut request = self
            .http_client
            .post(&url)
            .json(&self.request_body(system, user));
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| EvalError::llm(format!("Chat completion request failed: {}", e)))
            .context("Failed to send HTTP request to the chat-completion API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EvalError::llm(format!(
                "Chat completion API error (status {}): {}",
                status, error_text
            ))
            .into());
        }

        let response_json: Value = response
            .json()
            .await
            .context("Failed to deserialize chat-completion response as JSON")?;

        parse_completion(&response_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LlmConfig {
        LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        assert!(matches!(
            OpenAiClient::new(LlmConfig::default()),
            Err(EvalError::Config(_))
        ));
        assert!(OpenAiClient::new(config()).is_ok());
    }

    #[test]
    fn test_request_body() {
        let client = OpenAiClient::new(config()).unwrap();
        let body = client.request_body("Summarize.", "Long text");

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Long text");
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_completion() {
        let response = json!({
            "choices": [{"message": {"role": "assistant", "content": "  A summary.\n"}}]
        });
        assert_eq!(parse_completion(&response).unwrap(), "A summary.");

        assert!(parse_completion(&json!({"choices": []})).is_err());
        assert!(parse_completion(&json!({"error": {"message": "bad"}})).is_err());
    }
}
