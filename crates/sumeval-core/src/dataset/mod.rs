//! Evaluation datasets
//!
//! Datasets are read from local JSON/YAML files or fetched by name through a
//! [`DatasetClient`].

mod example;
mod loader;
mod source;

pub use example::{Dataset, DatasetOrigin, Example};
pub use loader::{DatasetLoader, load_dataset_from_json};
pub use source::{DatasetClient, DatasetSource};
