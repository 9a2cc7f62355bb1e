//! Graph loading errors.

use std::path::PathBuf;

/// Failure to load the JSON model. Always fatal to a generation run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The model file could not be read.
    #[error("Failed to read model {}: {source}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The model file is not valid JSON.
    #[error("Failed to decode JSON from {}: {source}", path.display())]
    Parse {
        /// Path that was requested (empty for in-memory sources).
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}
