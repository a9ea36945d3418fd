//! Code execution
//!
//! The evaluator never runs submitted code itself. It hands each test case to a
//! [`CodeRunner`], which is either a sandbox (Docker) or a simulation.

pub mod docker;
pub mod languages;
pub mod simulated;

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    config::{RunnerBackend, RunnerConfig},
    error::AppResult,
    models::{RunOutcome, TestCase},
};

pub use docker::DockerRunner;
pub use languages::LanguageHandler;
pub use simulated::SimulatedRunner;

/// Runs untrusted source against one test case
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeRunner: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn run(&self, language: &str, source: &str, test_case: &TestCase)
    -> AppResult<RunOutcome>;
}

/// Build the configured runner
pub async fn from_config(config: &RunnerConfig) -> AppResult<Arc<dyn CodeRunner>> {
    match config.backend {
        RunnerBackend::Simulated => Ok(Arc::new(SimulatedRunner::new(config.simulated_pass_rate))),
        RunnerBackend::Docker => Ok(Arc::new(DockerRunner::connect(config.clone()).await?)),
    }
}
