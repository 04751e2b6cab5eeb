//! nbrun - notebook runner with cached dataset preview
//!
//! Runs a project notebook through an external batch engine (papermill),
//! then looks for the dataset the notebook caches in the results directory
//! and prints the first rows of it.
//!
//! # Modules
//!
//! - `adapters`: External notebook engines (papermill)
//! - `core`: Orchestration logic (Orchestrator, preview rendering)
//! - `domain`: Data structures (Run, CachedArtifact)
//! - `results`: Results directory accessor
//! - `config`: Project layout resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Execute the notebook and preview results/iris.data.pkl
//! nbrun
//!
//! # Preview the cached dataset without running the notebook
//! nbrun preview --rows 5
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod results;

// Re-export main types at crate root for convenience
pub use adapters::{EngineError, NotebookEngine, PapermillEngine};
pub use config::ResolvedConfig;
pub use crate::core::{Orchestrator, RunError};
pub use domain::{CachedArtifact, Run, RunState};
pub use results::{ArtifactError, ResultsStore, IRIS_ARTIFACT};
