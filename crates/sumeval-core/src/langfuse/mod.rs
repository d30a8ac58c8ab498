//! Langfuse collaborator
//!
//! Remote datasets come from the public dataset-items API; traces and
//! scores are sent through the batched ingestion API.

mod client;
mod sink;

pub use client::LangfuseClient;
pub use sink::LangfuseSink;

use serde::{Deserialize, Serialize};

/// Langfuse connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangfuseConfig {
    /// Base URL of the Langfuse instance
    #[serde(default = "default_host")]
    pub host: String,

    /// Public key; usually taken from `LANGFUSE_PUBLIC_KEY`
    #[serde(default, skip_serializing)]
    pub public_key: Option<String>,

    /// Secret key; usually taken from `LANGFUSE_SECRET_KEY`
    #[serde(default, skip_serializing)]
    pub secret_key: Option<String>,

    /// Trace name for each evaluated example
    #[serde(default = "default_trace_name")]
    pub trace_name: String,

    /// Dataset run that traces of remote examples are linked to
    #[serde(default)]
    pub run_name: Option<String>,

    /// Events buffered before an ingestion request is sent
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Items requested per dataset page
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_host() -> String {
    "https://cloud.langfuse.com".to_string()
}

fn default_trace_name() -> String {
    "summary-eval".to_string()
}

fn default_batch_size() -> usize {
    50
}

fn default_page_size() -> usize {
    50
}

impl Default for LangfuseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            public_key: None,
            secret_key: None,
            trace_name: default_trace_name(),
            run_name: None,
            batch_size: default_batch_size(),
            page_size: default_page_size(),
        }
    }
}

impl LangfuseConfig {
    /// Whether both keys are present
    pub fn has_credentials(&self) -> bool {
        self.public_key.is_some() && self.secret_key.is_some()
    }
}
