//! Langfuse trace sink
//!
//! Each record becomes a `trace-create` event, a `generation-create` event
//! when the producing model is known, and a `score-create` event when it
//! carries a score. Events are buffered and sent in batches.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};
use uuid::Uuid;

use super::LangfuseClient;
use crate::metrics::{EvaluationRecord, Score};
use crate::trace::RecordSink;

/// Trace awaiting a dataset-run link
#[derive(Debug, Clone)]
struct RunLink {
    dataset_item_id: String,
    trace_id: String,
}

#[derive(Default)]
struct Pending {
    events: Vec<Value>,
    links: Vec<RunLink>,
}

/// Sink sending records to Langfuse
pub struct LangfuseSink {
    client: Arc<LangfuseClient>,
    dataset: Option<String>,
    score_name: String,
    run_name: Option<String>,
    model: Option<String>,
    system_prompt: Option<String>,
    pending: Mutex<Pending>,
}

impl LangfuseSink {
    pub fn new(client: Arc<LangfuseClient>) -> Self {
        let run_name = client.config().run_name.clone();
        Self {
            client,
            dataset: None,
            score_name: "auto-eval".to_string(),
            run_name,
            model: None,
            system_prompt: None,
            pending: Mutex::new(Pending::default()),
        }
    }

    /// Dataset name stored in trace metadata
    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = Some(dataset.into());
        self
    }

    /// Name under which scores are reported
    pub fn with_score_name(mut self, name: impl Into<String>) -> Self {
        self.score_name = name.into();
        self
    }

    /// Link every trace to its dataset item under this run
    ///
    /// Only meaningful for remote datasets, whose identifiers are item ids.
    pub fn with_run_name(mut self, run_name: Option<String>) -> Self {
        self.run_name = run_name;
        self
    }

    /// Model that produced the outputs; adds a generation per trace
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// System prompt sent alongside each input
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Number of events waiting to be sent
    pub fn buffered_events(&self) -> usize {
        self.pending.lock().events.len()
    }

    fn build_events(&self, record: &EvaluationRecord, trace_id: &str) -> Vec<Value> {
        let timestamp = Utc::now().to_rfc3339();
        let mut metadata = json!({
            "dataset_item_id": record.identifier,
            "elapsed_ms": record.elapsed_ms,
        });
        if let Some(dataset) = &self.dataset {
            metadata["dataset"] = json!(dataset);
        }
        if !record.expected_output.is_empty() {
            metadata["expected_output"] = json!(record.expected_output);
        }
        if let Some(error) = &record.error {
            metadata["error"] = json!(error.message);
            metadata["error_kind"] = json!(error.kind);
        }
        if let Some(model) = &self.model {
            metadata["model"] = json!(model);
        }

        let mut events = vec![json!({
            "id": Uuid::new_v4().to_string(),
            "timestamp": timestamp,
            "type": "trace-create",
            "body": {
                "id": trace_id,
                "name": self.client.config().trace_name,
                "timestamp": timestamp,
                "input": record.input,
                "output": record.output,
                "metadata": metadata,
            }
        })];

        if let Some(model) = &self.model {
            let mut messages = Vec::new();
            if let Some(prompt) = &self.system_prompt {
                messages.push(json!({ "role": "system", "content": prompt }));
            }
            messages.push(json!({ "role": "user", "content": record.input }));

            let mut body = json!({
                "id": Uuid::new_v4().to_string(),
                "traceId": trace_id,
                "name": "summarize",
                "startTime": timestamp,
                "model": model,
                "input": messages,
                "output": record.output,
            });
            if let Some(error) = &record.error {
                body["level"] = json!("ERROR");
                body["statusMessage"] = json!(error.message);
            }
            events.push(json!({
                "id": Uuid::new_v4().to_string(),
                "timestamp": timestamp,
                "type": "generation-create",
                "body": body,
            }));
        }

        if let Some(score) = record.score {
            let (value, data_type) = match score {
                Score::Value(v) => (json!(v), "NUMERIC"),
                Score::Pending => (json!("pending"), "CATEGORICAL"),
            };
            events.push(json!({
                "id": Uuid::new_v4().to_string(),
                "timestamp": timestamp,
                "type": "score-create",
                "body": {
                    "id": Uuid::new_v4().to_string(),
                    "traceId": trace_id,
                    "name": self.score_name,
                    "value": value,
                    "dataType": data_type,
                    "comment": "sumeval",
                }
            }));
        }

        events
    }

    /// Metadata attached to dataset-run links
    fn link_metadata(&self) -> Option<Value> {
        self.model.as_ref().map(|model| json!({ "model": model }))
    }

    /// Take everything buffered, leaving the buffer empty
    fn drain(&self) -> Pending {
        std::mem::take(&mut *self.pending.lock())
    }

    async fn send(&self, pending: Pending) -> Result<()> {
        self.client.ingest(pending.events).await?;

        if let Some(run_name) = &self.run_name {
            let metadata = self.link_metadata();
            for link in pending.links {
                self.client
                    .link_dataset_run_item(
                        run_name,
                        &link.dataset_item_id,
                        &link.trace_id,
                        metadata.as_ref(),
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordSink for LangfuseSink {
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
        let trace_id = Uuid::new_v4().to_string();
        let events = self.build_events(record, &trace_id);

        let full = {
            let mut pending = self.pending.lock();
            pending.events.extend(events);
            if self.run_name.is_some() {
                pending.links.push(RunLink {
                    dataset_item_id: record.identifier.clone(),
                    trace_id,
                });
            }
            pending.events.len() >= self.client.config().batch_size
        };

        if full {
            self.send(self.drain()).await?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let pending = self.drain();
        if pending.events.is_empty() && pending.links.is_empty() {
            return Ok(());
        }
        self.send(pending).await
    }
}
