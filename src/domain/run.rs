//! Run state for a single orchestrator invocation.
//!
//! A run moves from `Running` to either `Done` or `NotebookFailed`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One end-to-end execution: notebook, then artifact preview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Notebook that was executed
    pub notebook: PathBuf,

    /// Current state of the run
    pub state: RunState,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,

    /// Whether the cached artifact was present after the notebook ran
    pub artifact_found: bool,

    /// Number of elements written to the preview
    pub previewed_rows: usize,
}

impl Run {
    /// Create a new run for a notebook
    pub fn new(notebook: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4(),
            notebook,
            state: RunState::Running,
            started_at: Utc::now(),
            finished_at: None,
            artifact_found: false,
            previewed_rows: 0,
        }
    }

    /// Mark the run as finished successfully
    pub fn finish(&mut self) {
        self.state = RunState::Done;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the run as failed during notebook execution
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = RunState::NotebookFailed {
            error: error.into(),
        };
        self.finished_at = Some(Utc::now());
    }

    /// Check if the run is still in progress
    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running)
    }

    /// Check if the run has reached a terminal state
    pub fn is_finished(&self) -> bool {
        !self.is_running()
    }
}

/// State of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunState {
    /// Notebook or preview still in progress
    #[default]
    Running,

    /// Finished, with or without an artifact to preview
    Done,

    /// The notebook engine reported a failure
    NotebookFailed { error: String },
}
