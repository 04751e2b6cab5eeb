//! Main orchestrator for a notebook run.
//!
//! Executes the notebook, then previews the cached dataset if the
//! notebook left one behind.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info, instrument};

use crate::adapters::{EngineError, NotebookEngine, PapermillEngine};
use crate::config::{PreviewSettings, ResolvedConfig};
use crate::domain::Run;
use crate::results::{ArtifactError, ResultsStore};

use super::preview::{Preview, PreviewError};

/// Errors that end a run
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Notebook execution failed: {notebook}")]
    NotebookExecution {
        notebook: PathBuf,
        /// The run, left in `RunState::NotebookFailed`
        run: Box<Run>,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error("Failed to write preview")]
    Output(#[source] io::Error),
}

/// Drives one notebook execution followed by the artifact preview
pub struct Orchestrator<E = PapermillEngine> {
    engine: E,
    store: ResultsStore,
    notebook: PathBuf,
    artifact: String,
    output: Option<PathBuf>,
    preview: PreviewSettings,
}

impl Orchestrator<PapermillEngine> {
    /// Create an orchestrator backed by papermill
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::with_engine(PapermillEngine::from_settings(&config.engine), config)
    }
}

impl<E: NotebookEngine> Orchestrator<E> {
    /// Create an orchestrator with a specific engine
    pub fn with_engine(engine: E, config: &ResolvedConfig) -> Self {
        Self {
            engine,
            store: ResultsStore::from_config(config),
            notebook: config.notebook.clone(),
            artifact: config.artifact.clone(),
            output: None,
            preview: config.preview,
        }
    }

    /// Keep the executed notebook at `path` instead of discarding it
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Get the results store
    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    /// Execute the notebook, then write the artifact preview to `out`
    #[instrument(skip(self, out), fields(engine = %self.engine.name(), notebook = %self.notebook.display()))]
    pub async fn run<W: Write>(&self, out: &mut W) -> Result<Run, RunError> {
        let mut run = Run::new(self.notebook.clone());
        info!(run_id = %run.id, "Executing notebook");

        match self
            .engine
            .execute(&self.notebook, self.output.as_deref())
            .await
        {
            Ok(report) => {
                info!(duration_ms = report.duration.as_millis() as u64, "Notebook finished");
                if let Some(ref kept) = report.output {
                    info!(output = %kept.display(), "Kept executed notebook");
                }
            }
            Err(source) => {
                run.fail(source.to_string());
                error!(run_id = %run.id, error = %source, "Notebook failed");
                return Err(RunError::NotebookExecution {
                    notebook: self.notebook.clone(),
                    run: Box::new(run),
                    source,
                });
            }
        }

        if let Some(preview) = self.preview_artifact()? {
            writeln!(out, "{}", preview.rendered).map_err(RunError::Output)?;
            run.artifact_found = true;
            run.previewed_rows = preview.shown;
        }

        run.finish();
        info!(
            run_id = %run.id,
            artifact_found = run.artifact_found,
            rows = run.previewed_rows,
            "Run completed"
        );
        Ok(run)
    }

    /// Load the configured artifact and build its preview, if it exists
    pub fn preview_artifact(&self) -> Result<Option<Preview>, RunError> {
        let Some(artifact) = self.store.load_optional(&self.artifact)? else {
            debug!(artifact = %self.artifact, "No cached artifact to preview");
            return Ok(None);
        };

        let preview = Preview::build(&artifact.value, self.preview.rows, self.preview.width)?;
        debug!(
            artifact = %artifact.name,
            shown = preview.shown,
            total = preview.total,
            "Built preview"
        );
        Ok(Some(preview))
    }
}
