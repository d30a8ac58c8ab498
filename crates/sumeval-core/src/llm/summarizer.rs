//! Summarizer unit of work

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::ChatClient;
use crate::runner::UnitOfWork;

/// Default instruction sent as the system message
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "Summarize the following technical description in 3-4 sentences.";

/// Sends each example input as the user message under a fixed system prompt
pub struct Summarizer {
    client: Arc<dyn ChatClient>,
    system_prompt: String,
}

impl Summarizer {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

#[async_trait]
impl UnitOfWork for Summarizer {
    async fn run(&self, input: &str) -> Result<String> {
        self.client.complete(&self.system_prompt, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct EchoClient {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatClient for EchoClient {
        async fn complete(&self, system: &str, user: &str) -> Result<String> {
            self.calls.lock().push((system.to_string(), user.to_string()));
            Ok(format!("summary of {}", user))
        }
    }

    #[tokio::test]
    async fn test_summarizer_forwards_prompt() {
        let client = Arc::new(EchoClient::default());
        let summarizer = Summarizer::new(client.clone()).with_system_prompt("Be brief.");

        let output = summarizer.run("the text").await.unwrap();

        assert_eq!(output, "summary of the text");
        let calls = client.calls.lock();
        assert_eq!(calls[0], ("Be brief.".to_string(), "the text".to_string()));
    }
}
