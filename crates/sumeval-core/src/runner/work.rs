//! Unit-of-work abstraction: the function under evaluation

use anyhow::Result;
use async_trait::async_trait;

/// Function evaluated once per example
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Produce an output for one example input
    async fn run(&self, input: &str) -> Result<String>;
}

/// Unit of work backed by a synchronous closure
pub struct FnUnitOfWork<F> {
    func: F,
}

impl<F> FnUnitOfWork<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> UnitOfWork for FnUnitOfWork<F>
where
    F: Fn(&str) -> Result<String> + Send + Sync,
{
    async fn run(&self, input: &str) -> Result<String> {
        (self.func)(input)
    }
}
