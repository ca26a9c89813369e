//! Error types for evergreen.
//!
//! Nothing in the simulation core is fatal: malformed landmark frames are
//! discarded, a missing gesture source degrades the scene to manual-toggle
//! mode, and numeric degeneracy is repaired in place. These types exist so
//! that the edges of the system (config loading, landmark ingestion, source
//! start-up) can report *why* something was ignored.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias for fallible operations at the crate's edges.
pub type Result<T> = std::result::Result<T, Error>;

/// A landmark frame that cannot be classified.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LandmarkError {
    /// The frame does not contain exactly 21 points.
    #[error("expected {expected} hand landmarks, got {actual}")]
    WrongCount { expected: usize, actual: usize },

    /// A coordinate is NaN or infinite.
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

/// Failure to load or validate a [`SceneConfig`](crate::config::SceneConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// A gesture source that could not start or stopped delivering frames.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The capability is absent (no camera, permission denied, no stream configured).
    #[error("gesture tracking unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read landmark stream {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("landmark stream line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Top-level error used by the runner binary.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),
}
