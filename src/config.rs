//! Configuration for nbrun paths and engine settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variable (NBRUN_ROOT) for the project root
//! 2. Config file (.nbrun/config.yaml)
//! 3. Defaults (current directory as project root)
//!
//! Config file discovery:
//! - Searches NBRUN_ROOT (or the current directory) and parents for
//!   .nbrun/config.yaml
//! - The project root is the directory that contains .nbrun/
//! - Relative paths in the config file resolve against the project root

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable overriding the project root
pub const ROOT_ENV: &str = "NBRUN_ROOT";

/// Directory holding the config file, relative to the project root
pub const CONFIG_DIR: &str = ".nbrun";

/// Notebook shipped with the project
pub const DEFAULT_NOTEBOOK: &str = "methods/notebooks/main.ipynb";

/// Results namespace, relative to the project root
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    /// Artifact file name inside the results directory
    #[serde(default)]
    pub artifact: Option<String>,
    #[serde(default)]
    pub engine: Option<EngineConfig>,
    #[serde(default)]
    pub preview: Option<PreviewConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Notebook document (relative to project root)
    pub notebook: Option<String>,
    /// Results directory (relative to project root)
    pub results: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub binary: Option<String>,
    pub kernel: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PreviewConfig {
    pub rows: Option<usize>,
    pub width: Option<usize>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// Project root directory
    pub root: PathBuf,
    /// Notebook to execute
    pub notebook: PathBuf,
    /// Results namespace directory
    pub results_dir: PathBuf,
    /// Name of the cached dataset artifact
    pub artifact: String,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Notebook engine settings
    pub engine: EngineSettings,
    /// Preview settings
    pub preview: PreviewSettings,
}

#[derive(Debug, Clone, Serialize)]
pub struct EngineSettings {
    pub binary: String,
    pub kernel: Option<String>,
    /// None means wait for the notebook indefinitely
    pub timeout_seconds: Option<u64>,
    pub parameters: BTreeMap<String, String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            binary: "papermill".to_string(),
            kernel: None,
            timeout_seconds: None,
            parameters: BTreeMap::new(),
        }
    }
}

impl EngineSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PreviewSettings {
    /// Number of leading elements to show
    pub rows: usize,
    /// Line width used for wrapping
    pub width: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self { rows: 10, width: 80 }
    }
}

impl ResolvedConfig {
    /// Load configuration from the current directory and environment
    pub fn load() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to determine current directory")?;
        let env_root = std::env::var_os(ROOT_ENV).map(PathBuf::from);
        Self::load_from(&cwd, env_root)
    }

    /// Load configuration starting the config file search at `start`.
    ///
    /// An `env_root` replaces `start`, so its own config file applies.
    pub fn load_from(start: &Path, env_root: Option<PathBuf>) -> Result<Self> {
        let search_from = env_root.clone().unwrap_or_else(|| start.to_path_buf());
        let config_file = find_config_file(&search_from);

        let config = match config_file {
            Some(ref path) => Some(load_config_file(path)?),
            None => None,
        };

        // .nbrun/config.yaml -> project root is the grandparent
        let file_root = config_file
            .as_ref()
            .and_then(|p| p.parent())
            .and_then(|p| p.parent())
            .map(Path::to_path_buf);

        let root = env_root.or(file_root).unwrap_or(search_from);

        let Some(config) = config else {
            return Ok(Self::with_root(root));
        };

        let notebook = resolve_path(
            &root,
            config.paths.notebook.as_deref().unwrap_or(DEFAULT_NOTEBOOK),
        );
        let results_dir = resolve_path(
            &root,
            config.paths.results.as_deref().unwrap_or(DEFAULT_RESULTS_DIR),
        );

        let engine = match config.engine {
            Some(engine) => EngineSettings {
                binary: engine
                    .binary
                    .unwrap_or_else(|| EngineSettings::default().binary),
                kernel: engine.kernel,
                timeout_seconds: engine.timeout_seconds,
                parameters: engine.parameters,
            },
            None => EngineSettings::default(),
        };

        let defaults = PreviewSettings::default();
        let preview = PreviewSettings {
            rows: config
                .preview
                .as_ref()
                .and_then(|p| p.rows)
                .unwrap_or(defaults.rows),
            width: config
                .preview
                .as_ref()
                .and_then(|p| p.width)
                .unwrap_or(defaults.width),
        };

        Ok(Self {
            root,
            notebook,
            results_dir,
            artifact: config
                .artifact
                .unwrap_or_else(|| crate::results::IRIS_ARTIFACT.to_string()),
            config_file,
            engine,
            preview,
        })
    }

    /// Default layout rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            notebook: root.join(DEFAULT_NOTEBOOK),
            results_dir: root.join(DEFAULT_RESULTS_DIR),
            root,
            artifact: crate::results::IRIS_ARTIFACT.to_string(),
            config_file: None,
            engine: EngineSettings::default(),
            preview: PreviewSettings::default(),
        }
    }
}

/// Find config file by searching `start` and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(CONFIG_DIR).join("config.yaml");
        if config_path.is_file() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
