//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Input path not found
    #[error("Input not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Input holds no readable recording
    #[error("No recordings found under {path}")]
    NoRecordings { path: PathBuf },

    /// Every recording of the batch failed
    #[error("All {count} recordings failed to load")]
    AllRecordingsFailed { count: usize },

    /// KPI export failure
    #[error("Failed to export {feature} KPI table: {message}")]
    Export { feature: String, message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn input_not_found(path: impl Into<PathBuf>) -> Self {
        Self::InputNotFound { path: path.into() }
    }

    pub fn export(feature: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Export {
            feature: feature.into(),
            message: message.into(),
        }
    }
}
