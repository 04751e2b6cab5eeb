//! Papermill adapter for notebook execution.
//!
//! Spawns the `papermill` CLI. Without an output path the executed
//! document is streamed to stdout (`-`) and dropped.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::{EngineError, ExecutionReport, NotebookEngine};
use crate::config::EngineSettings;

/// Papermill adapter using subprocess mode
#[derive(Debug, Clone)]
pub struct PapermillEngine {
    /// Path to the papermill binary (default: "papermill")
    binary_path: String,

    /// Jupyter kernel name passed with `-k`
    kernel: Option<String>,

    /// Notebook parameters passed with `-p`
    parameters: BTreeMap<String, String>,

    /// None waits indefinitely
    timeout: Option<Duration>,
}

impl Default for PapermillEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PapermillEngine {
    /// Create an adapter that runs `papermill` from PATH
    pub fn new() -> Self {
        Self::with_binary_path("papermill")
    }

    /// Create an adapter with a custom binary path
    pub fn with_binary_path(binary_path: impl Into<String>) -> Self {
        Self {
            binary_path: binary_path.into(),
            kernel: None,
            parameters: BTreeMap::new(),
            timeout: None,
        }
    }

    /// Create an adapter from resolved engine settings
    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            binary_path: settings.binary.clone(),
            kernel: settings.kernel.clone(),
            parameters: settings.parameters.clone(),
            timeout: settings.timeout(),
        }
    }

    pub fn with_kernel(mut self, kernel: impl Into<String>) -> Self {
        self.kernel = Some(kernel.into());
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    /// Build the papermill argument list
    pub fn command_args(&self, notebook: &Path, output: Option<&Path>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            notebook.as_os_str().to_owned(),
            output
                .map(|p| p.as_os_str().to_owned())
                .unwrap_or_else(|| OsString::from("-")),
        ];

        if let Some(ref kernel) = self.kernel {
            args.push("-k".into());
            args.push(kernel.into());
        }

        for (name, value) in &self.parameters {
            args.push("-p".into());
            args.push(name.into());
            args.push(value.into());
        }

        args
    }
}

#[async_trait]
impl NotebookEngine for PapermillEngine {
    fn name(&self) -> &str {
        "papermill"
    }

    async fn execute(
        &self,
        notebook: &Path,
        output: Option<&Path>,
    ) -> Result<ExecutionReport, EngineError> {
        let args = self.command_args(notebook, output);
        debug!(binary = %self.binary_path, ?args, "Spawning papermill");

        let started = Instant::now();
        let child = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EngineError::Spawn {
                binary: self.binary_path.clone(),
                source,
            })?;

        let result = match self.timeout {
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| EngineError::TimedOut(limit))?,
            None => child.wait_with_output().await,
        };
        let output_status = result.map_err(EngineError::Wait)?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            let exit_code = output_status.status.code().unwrap_or(-1);
            warn!(exit_code, "Papermill reported a failure");
            return Err(EngineError::Failed {
                exit_code,
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(ExecutionReport {
            output: output.map(PathBuf::from),
            duration: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_papermill_adapter_creation() {
        let engine = PapermillEngine::new();
        assert_eq!(engine.name(), "papermill");
        assert_eq!(engine.binary_path, "papermill");
        assert!(engine.timeout.is_none());
    }

    #[test]
    fn test_args_discard_output_by_default() {
        let engine = PapermillEngine::new();
        let args = engine.command_args(Path::new("nb/main.ipynb"), None);
        assert_eq!(args, vec![OsString::from("nb/main.ipynb"), OsString::from("-")]);
    }

    #[test]
    fn test_args_with_output_kernel_and_parameters() {
        let engine = PapermillEngine::with_binary_path("/opt/papermill")
            .with_kernel("python3")
            .with_parameter("seed", "7")
            .with_parameter("alpha", "0.5");

        let args = engine.command_args(Path::new("main.ipynb"), Some(Path::new("out.ipynb")));
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "main.ipynb",
                "out.ipynb",
                "-k",
                "python3",
                "-p",
                "alpha",
                "0.5",
                "-p",
                "seed",
                "7",
            ]
        );
    }

    #[test]
    fn test_from_settings() {
        let settings = EngineSettings {
            binary: "pm".to_string(),
            kernel: Some("ir".to_string()),
            timeout_seconds: Some(30),
            parameters: BTreeMap::new(),
        };
        let engine = PapermillEngine::from_settings(&settings);
        assert_eq!(engine.binary_path, "pm");
        assert_eq!(engine.kernel.as_deref(), Some("ir"));
        assert_eq!(engine.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let engine = PapermillEngine::with_binary_path("/nonexistent/nbrun-papermill");
        let result = engine.execute(Path::new("main.ipynb"), None).await;
        assert!(matches!(result, Err(EngineError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let engine = PapermillEngine::with_binary_path("false");
        let result = engine.execute(Path::new("main.ipynb"), None).await;
        assert!(matches!(
            result,
            Err(EngineError::Failed { exit_code: 1, .. })
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_zero_exit_is_success() {
        let engine = PapermillEngine::with_binary_path("true");
        let report = engine.execute(Path::new("main.ipynb"), None).await.unwrap();
        assert!(report.output.is_none());
    }
}
