//! Error types for the parts of the crate that touch the outside world.
//!
//! Scanning, parsing and token assembly never fail; an unusable scan is
//! reported through the `healthy` flag instead. Only configuration loading
//! and output serialization produce errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading configuration or writing output.
#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization failed: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl DocsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
