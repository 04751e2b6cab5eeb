//! Accessor for the results directory.
//!
//! The notebook caches its dataset here as a pickle. Nothing is loaded
//! until a caller asks for it; every call site goes through
//! [`ResultsStore`].

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use serde_pickle::DeOptions;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::ResolvedConfig;
use crate::domain::CachedArtifact;

/// Dataset cached by the project notebook
pub const IRIS_ARTIFACT: &str = "iris.data.pkl";

/// Resolve the results directory for a configuration
pub fn resolve_base_path(config: &ResolvedConfig) -> PathBuf {
    config.results_dir.clone()
}

/// Errors reading an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Artifact is not a valid pickle: {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_pickle::Error,
    },

    #[error("Failed to read artifact: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Read-only view over a results directory
#[derive(Debug, Clone)]
pub struct ResultsStore {
    base: PathBuf,
}

impl ResultsStore {
    /// Create a store over `base`
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Create a store over the configured results directory
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(resolve_base_path(config))
    }

    /// Get the results directory
    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Full path of a named artifact
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.base.join(name)
    }

    /// Whether a regular file named `name` exists.
    ///
    /// Filesystem errors (permissions, broken links) count as absent.
    pub fn exists(&self, name: &str) -> bool {
        self.artifact_path(name).is_file()
    }

    /// Load and decode a named artifact
    #[instrument(skip(self), fields(base = %self.base.display()))]
    pub fn load(&self, name: &str) -> Result<CachedArtifact, ArtifactError> {
        let path = self.artifact_path(name);

        let file = File::open(&path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ArtifactError::NotFound { path: path.clone() }
            } else {
                ArtifactError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;

        let metadata = file.metadata().map_err(|source| ArtifactError::Io {
            path: path.clone(),
            source,
        })?;

        // Same rule as `exists`: anything but a regular file is absent
        if !metadata.is_file() {
            return Err(ArtifactError::NotFound { path });
        }
        let size_bytes = metadata.len();

        let value = serde_pickle::value_from_reader(BufReader::new(file), DeOptions::new())
            .map_err(|source| match source {
                // A short read means truncated content, not a failing disk
                serde_pickle::Error::Io(source)
                    if source.kind() != io::ErrorKind::UnexpectedEof =>
                {
                    ArtifactError::Io {
                        path: path.clone(),
                        source,
                    }
                }
                source => ArtifactError::Corrupt {
                    path: path.clone(),
                    source,
                },
            })?;

        let artifact = CachedArtifact::new(name, path, value, size_bytes);
        debug!(
            path = %artifact.path.display(),
            size_bytes,
            elements = ?artifact.len(),
            "Loaded artifact"
        );

        Ok(artifact)
    }

    /// Load a named artifact, or `None` if it does not exist
    pub fn load_optional(&self, name: &str) -> Result<Option<CachedArtifact>, ArtifactError> {
        match self.load(name) {
            Ok(artifact) => Ok(Some(artifact)),
            Err(ArtifactError::NotFound { path }) => {
                debug!(path = %path.display(), "Artifact absent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
