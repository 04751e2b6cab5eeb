//! Core orchestration logic.
//!
//! This module contains:
//! - Orchestrator: Notebook execution followed by the artifact preview
//! - Preview: Slicing and pprint-style rendering of decoded values

pub mod orchestrator;
pub mod preview;

// Re-export commonly used types
pub use orchestrator::{Orchestrator, RunError};
pub use preview::{Preview, PreviewError};
