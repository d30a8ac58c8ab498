//! JSON Lines sink
//!
//! Appends one JSON object per record to a file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::RecordSink;
use crate::metrics::EvaluationRecord;

#[derive(Serialize)]
struct JsonlLine<'a> {
    recorded_at: chrono::DateTime<Utc>,
    #[serde(flatten)]
    record: &'a EvaluationRecord,
}

/// Sink appending records to a JSON Lines file
pub struct JsonlSink {
    path: PathBuf,
    file: Mutex<Option<tokio::fs::File>>,
}

impl JsonlSink {
    /// Create a sink writing to `path`; the file is opened on first write
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> Result<tokio::fs::File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open trace file {:?}", self.path))
    }
}

#[async_trait]
impl RecordSink for JsonlSink {
    async fn record_example(&self, record: &EvaluationRecord) -> Result<()> {
        let mut line = serde_json::to_string(&JsonlLine {
            recorded_at: Utc::now(),
            record,
        })?;
        line.push('\n');

        let mut guard = self.file.lock().await;
        if guard.is_none() {
            *guard = Some(self.open().await?);
        }
        if let Some(file) = guard.as_mut() {
            file.write_all(line.as_bytes())
                .await
                .with_context(|| format!("Failed to write trace file {:?}", self.path))?;
        }
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        if let Some(file) = self.file.lock().await.as_mut() {
            file.flush().await?;
        }
        Ok(())
    }
}
