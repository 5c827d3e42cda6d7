//! Segmenter error types

use std::path::PathBuf;
use thiserror::Error;

/// Segmenter-specific errors
#[derive(Debug, Error)]
pub enum SegmenterError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Persisted window could not be decoded
    #[error("failed to decode window '{}': {message}", path.display())]
    Decode { path: PathBuf, message: String },

    /// Detection or sink error (from contract)
    #[error("segmentation error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmenterError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }
}
