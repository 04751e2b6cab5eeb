//! Adapter interfaces for external notebook engines.
//!
//! The orchestrator only sees [`NotebookEngine`]; papermill is driven
//! through a subprocess.

pub mod papermill;

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

// Re-export the papermill adapter
pub use papermill::PapermillEngine;

/// Outcome of a successful notebook execution
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    /// Executed notebook document, if one was kept
    pub output: Option<PathBuf>,

    /// Wall-clock execution time
    pub duration: Duration,
}

impl ExecutionReport {
    /// Create a report for a run that kept no output document
    pub fn discarded(duration: Duration) -> Self {
        Self {
            output: None,
            duration,
        }
    }
}

/// Failures reported by a notebook engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to spawn notebook engine '{binary}'")]
    Spawn {
        binary: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for notebook engine")]
    Wait(#[source] io::Error),

    #[error("Notebook engine exited with code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },

    #[error("Notebook engine timed out after {0:?}")]
    TimedOut(Duration),
}

/// Trait for external notebook execution engines
#[async_trait]
pub trait NotebookEngine: Send + Sync {
    /// Human-readable engine name
    fn name(&self) -> &str;

    /// Run every cell of `notebook` in order.
    ///
    /// `output` is where the executed document is written; `None`
    /// discards it. Returns once the engine has finished.
    async fn execute(
        &self,
        notebook: &Path,
        output: Option<&Path>,
    ) -> Result<ExecutionReport, EngineError>;
}
