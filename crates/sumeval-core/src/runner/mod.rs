//! Evaluation runner components
//!
//! This module provides the execution infrastructure for running datasets
//! through a unit of work.

mod config;
mod harness;
mod work;

pub use config::{DatasetMode, EvalConfig};
pub use harness::{EvalHarness, EvalProgress, ProgressCallback};
pub use work::{FnUnitOfWork, UnitOfWork};
