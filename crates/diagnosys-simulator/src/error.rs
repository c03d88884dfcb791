//! Error types for diagnosys-simulator

use std::path::PathBuf;
use thiserror::Error;

/// Simulator errors.
///
/// Physics and fault-state updates never fail; everything here comes from
/// configuration, the output directory, or the persistence layer.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Output directory {path:?} is not usable: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Failed to publish {path:?}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown asset: {0}")]
    UnknownAsset(String),

    #[error("Task join failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for simulator operations
pub type Result<T> = std::result::Result<T, SimError>;

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Serialization(e.to_string())
    }
}

impl From<serde_yaml::Error> for SimError {
    fn from(e: serde_yaml::Error) -> Self {
        SimError::Serialization(e.to_string())
    }
}
