//! Cached artifacts read from the results directory.

use std::path::PathBuf;

use serde_pickle::Value;

/// A dataset artifact decoded into memory
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// File name inside the results directory
    pub name: String,

    /// Full path the artifact was read from
    pub path: PathBuf,

    /// Decoded value
    pub value: Value,

    /// Size of the file in bytes
    pub size_bytes: u64,
}

impl CachedArtifact {
    /// Create a new artifact record
    pub fn new(name: impl Into<String>, path: PathBuf, value: Value, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            path,
            value,
            size_bytes,
        }
    }

    /// Number of top-level elements, if the value is a container
    pub fn len(&self) -> Option<usize> {
        match &self.value {
            Value::List(items) | Value::Tuple(items) => Some(items.len()),
            Value::Set(items) | Value::FrozenSet(items) => Some(items.len()),
            Value::Dict(entries) => Some(entries.len()),
            Value::String(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_len() {
        let artifact = CachedArtifact::new(
            "iris.data.pkl",
            PathBuf::from("/tmp/results/iris.data.pkl"),
            Value::List(vec![Value::I64(1), Value::I64(2)]),
            42,
        );

        assert_eq!(artifact.name, "iris.data.pkl");
        assert_eq!(artifact.len(), Some(2));
    }

    #[test]
    fn test_scalar_has_no_len() {
        let artifact = CachedArtifact::new("n.pkl", PathBuf::from("n.pkl"), Value::I64(7), 4);
        assert_eq!(artifact.len(), None);
    }
}
