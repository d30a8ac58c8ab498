//! Chat-completion collaborator
//!
//! A thin client for OpenAI-compatible `/chat/completions` endpoints and the
//! summarizer unit of work built on top of it.

mod openai;
mod summarizer;

pub use openai::OpenAiClient;
pub use summarizer::{DEFAULT_SYSTEM_PROMPT, Summarizer};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Capability to complete a two-message chat
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Return the assistant reply for a system and a user message
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

/// Chat-completion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// API base URL, without the `/chat/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token; usually taken from `OPENAI_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// System prompt for the summarizer
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_request_timeout() -> u64 {
    120
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            api_key: None,
            system_prompt: default_system_prompt(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}
