//! Dataset sources: local files and remote collections

use std::path::PathBuf;

use async_trait::async_trait;

use super::{Dataset, DatasetLoader};
use crate::error::{EvalError, EvalResult};

/// Capability to fetch a named dataset from a remote service
#[async_trait]
pub trait DatasetClient: Send + Sync {
    /// Fetch every item of the named dataset, in the service's order
    async fn get_dataset(&self, name: &str) -> anyhow::Result<Dataset>;
}

/// Where a run takes its examples from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// Structured file on disk
    Local(PathBuf),
    /// Named collection behind a [`DatasetClient`]
    Remote(String),
}

impl DatasetSource {
    /// Short label for logs
    pub fn describe(&self) -> String {
        match self {
            DatasetSource::Local(path) => format!("local:{}", path.display()),
            DatasetSource::Remote(name) => format!("remote:{}", name),
        }
    }

    /// Load the full dataset
    ///
    /// Remote sources require a client; every failure is reported as
    /// [`EvalError::DatasetLoad`].
    pub async fn load(&self, client: Option<&dyn DatasetClient>) -> EvalResult<Dataset> {
        match self {
            DatasetSource::Local(path) => DatasetLoader::new(path).load(),
            DatasetSource::Remote(name) => {
                let client = client.ok_or_else(|| {
                    EvalError::dataset_load(format!(
                        "Remote dataset '{}' requested but no dataset client is configured",
                        name
                    ))
                })?;
                let dataset = client.get_dataset(name).await.map_err(|e| {
                    EvalError::dataset_load(format!("Failed to fetch dataset '{}': {:#}", name, e))
                })?;
                tracing::debug!(dataset = %name, count = dataset.len(), "Fetched remote dataset");
                Ok(dataset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{DatasetOrigin, Example};

    struct FakeClient;

    #[async_trait]
    impl DatasetClient for FakeClient {
        async fn get_dataset(&self, name: &str) -> anyhow::Result<Dataset> {
            if name == "missing" {
                anyhow::bail!("404 Not Found");
            }
            Ok(Dataset::new(
                name,
                DatasetOrigin::Remote,
                vec![Example::new("item-a", "text").with_expected("ref")],
            ))
        }
    }

    #[tokio::test]
    async fn test_remote_source_uses_client() {
        let source = DatasetSource::Remote("summarizer".to_string());
        let dataset = source.load(Some(&FakeClient)).await.unwrap();

        assert_eq!(dataset.origin, DatasetOrigin::Remote);
        assert_eq!(dataset.examples[0].identifier, "item-a");
    }

    #[tokio::test]
    async fn test_remote_failure_is_dataset_load_error() {
        let source = DatasetSource::Remote("missing".to_string());
        let err = source.load(Some(&FakeClient)).await.unwrap_err();

        match err {
            EvalError::DatasetLoad(msg) => assert!(msg.contains("404")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_remote_without_client_fails() {
        let source = DatasetSource::Remote("summarizer".to_string());
        assert!(matches!(
            source.load(None).await,
            Err(EvalError::DatasetLoad(_))
        ));
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            DatasetSource::Remote("summarizer".into()).describe(),
            "remote:summarizer"
        );
    }
}
