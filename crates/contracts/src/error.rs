//! Layered error definitions
//!
//! Categorized by source: config / calibration / signal / window / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Calibration Errors =====
    /// Calibration table failed shape/type validation
    #[error("malformed calibration '{name}': {message}")]
    MalformedCalibration { name: String, message: String },

    // ===== Signal Errors =====
    /// Required channel absent or empty
    #[error("missing signal '{channel}'")]
    MissingSignal { channel: String },

    /// Channel length does not match the time vector
    #[error("channel '{channel}' has {actual} samples, time vector has {expected}")]
    ChannelLength {
        channel: String,
        expected: usize,
        actual: usize,
    },

    /// Time vector is not strictly increasing
    #[error("time vector is not strictly increasing at index {index}")]
    NonMonotonicTime { index: usize },

    /// Index is None, negative or out of bounds
    #[error("invalid index for '{context}': {message}")]
    InvalidIndex { context: String, message: String },

    // ===== Window Errors =====
    /// Window with non-positive duration or no samples
    #[error("degenerate window '{name}': {message}")]
    DegenerateWindow { name: String, message: String },

    // ===== KPI Table Errors =====
    /// Unknown column, type mismatch or write after finalize
    #[error("kpi column '{column}': {message}")]
    KpiColumn { column: String, message: String },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create malformed calibration error
    pub fn malformed_calibration(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedCalibration {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create missing signal error
    pub fn missing_signal(channel: impl Into<String>) -> Self {
        Self::MissingSignal {
            channel: channel.into(),
        }
    }

    /// Create invalid index error
    pub fn invalid_index(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidIndex {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create degenerate window error
    pub fn degenerate_window(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DegenerateWindow {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create KPI column error
    pub fn kpi_column(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::KpiColumn {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
