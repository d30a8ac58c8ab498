//! Langfuse HTTP client

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use super::LangfuseConfig;
use crate::dataset::{Dataset, DatasetClient, DatasetOrigin, Example};
use crate::error::EvalError;

/// Client for the Langfuse public API
pub struct LangfuseClient {
    config: LangfuseConfig,
    http_client: Client,
}

impl LangfuseClient {
    /// Create a new client; both keys must be configured
    pub fn new(config: LangfuseConfig) -> Result<Self, EvalError> {
        if !config.has_credentials() {
            return Err(EvalError::config(
                "Langfuse requires LANGFUSE_PUBLIC_KEY and LANGFUSE_SECRET_KEY",
            ));
        }
        let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Create a client and check its credentials before any work starts
    pub async fn connect(config: LangfuseConfig) -> Result<Self, EvalError> {
        let client = Self::new(config)?;
        client
            .auth_check()
            .await
            .map_err(|e| EvalError::config(format!("Langfuse auth check failed: {:#}", e)))?;
        tracing::debug!(host = %client.config.host, "Langfuse credentials accepted");
        Ok(client)
    }

    pub fn config(&self) -> &LangfuseConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.host.trim_end_matches('/'), path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request.basic_auth(
            self.config.public_key.as_deref().unwrap_or_default(),
            self.config.secret_key.as_deref(),
        )
    }

    /// Check that the credentials are accepted
    pub async fn auth_check(&self) -> Result<()> {
        let response = self
            .authorized(self.http_client.get(self.url("/api/public/projects")))
            .send()
            .await
            .context("Failed to reach Langfuse")?;
        if !response.status().is_success() {
            bail!("Langfuse rejected credentials (status {})", response.status());
        }
        Ok(())
    }

    /// Send a batch of ingestion events
    ///
    /// Langfuse answers 207 with per-event errors; any event error fails the
    /// whole call.
    pub async fn ingest(&self, batch: Vec<Value>) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        let response = self
            .authorized(self.http_client.post(self.url("/api/public/ingestion")))
            .json(&json!({ "batch": batch }))
            .send()
            .await
            .context("Failed to send ingestion batch to Langfuse")?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            bail!("Langfuse ingestion failed (status {}): {}", status, body);
        }
        if let Some(errors) = body["errors"].as_array().filter(|e| !e.is_empty()) {
            bail!(
                "Langfuse rejected {} of {} events: {}",
                errors.len(),
                count,
                Value::Array(errors.clone())
            );
        }
        tracing::debug!(events = count, "Sent ingestion batch");
        Ok(())
    }

    /// Link a trace to a dataset item under a named run
    pub async fn link_dataset_run_item(
        &self,
        run_name: &str,
        dataset_item_id: &str,
        trace_id: &str,
        metadata: Option<&Value>,
    ) -> Result<()> {
        let response = self
            .authorized(self.http_client.post(self.url("/api/public/dataset-run-items")))
            .json(&run_item_body(run_name, dataset_item_id, trace_id, metadata))
            .send()
            .await
            .context("Failed to create dataset run item")?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            bail!("Dataset run item rejected (status {}): {}", status, text);
        }
        Ok(())
    }
}

#[async_trait]
impl DatasetClient for LangfuseClient {
    async fn get_dataset(&self, name: &str) -> Result<Dataset> {
        let mut examples = Vec::new();
        let mut page = 1usize;

        loop {
            let response = self
                .authorized(self.http_client.get(self.url("/api/public/dataset-items")))
                .query(&[
                    ("datasetName", name.to_string()),
                    ("page", page.to_string()),
                    ("limit", self.config.page_size.to_string()),
                ])
                .send()
                .await
                .with_context(|| format!("Failed to fetch page {} of dataset '{}'", page, name))?;

            if !response.status().is_success() {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                bail!("Langfuse dataset request failed (status {}): {}", status, text);
            }

            let body: Value = response
                .json()
                .await
                .context("Failed to parse dataset page")?;
            let (items, total_pages) = parse_dataset_page(&body)?;
            examples.extend(items);

            if page >= total_pages {
                break;
            }
            page += 1;
        }

        Ok(Dataset::new(name, DatasetOrigin::Remote, examples))
    }
}

/// Parse one page of `/api/public/dataset-items`
///
/// Archived items are skipped. Returns the examples and the total page count.
fn parse_dataset_page(body: &Value) -> Result<(Vec<Example>, usize)> {
    let items = body["data"]
        .as_array()
        .ok_or_else(|| anyhow!("Dataset page has no 'data' array"))?;

    let mut examples = Vec::with_capacity(items.len());
    for item in items {
        if item["status"].as_str() == Some("ARCHIVED") {
            continue;
        }
        let id = item["id"]
            .as_str()
            .ok_or_else(|| anyhow!("Dataset item without id"))?;
        let input = value_to_text(&item["input"])
            .ok_or_else(|| anyhow!("Dataset item {} has no input", id))?;
        let expected = value_to_text(&item["expectedOutput"]).unwrap_or_default();
        examples.push(Example::new(id, input).with_expected(expected));
    }

    let total_pages = body["meta"]["totalPages"].as_u64().unwrap_or(1) as usize;
    Ok((examples, total_pages))
}

/// Request body for `/api/public/dataset-run-items`
fn run_item_body(
    run_name: &str,
    dataset_item_id: &str,
    trace_id: &str,
    metadata: Option<&Value>,
) -> Value {
    let mut body = json!({
        "runName": run_name,
        "datasetItemId": dataset_item_id,
        "traceId": trace_id,
    });
    if let Some(metadata) = metadata {
        body["metadata"] = metadata.clone();
    }
    body
}

/// Render a JSON field as text; strings stay verbatim, null is absent
fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
