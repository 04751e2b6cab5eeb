//! Domain types for nbrun.
//!
//! This module contains the core data structures:
//! - Run: State of one notebook-and-preview execution
//! - CachedArtifact: A dataset decoded from the results directory

pub mod artifact;
pub mod run;

// Re-export commonly used types
pub use artifact::CachedArtifact;
pub use run::{Run, RunState};
