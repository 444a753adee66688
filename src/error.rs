/*!
Error types for meshbridge operations

Error handling for configuration, topology reporting, and mesh stack
integration failures. Nothing here is ever allowed to escape the control
loop; report failures in particular are logged and dropped by design.
*/

use thiserror::Error;

/// Result type alias for meshbridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error types for meshbridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Topology report delivery errors
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal errors that shouldn't normally occur
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures delivering a topology report to the collector
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Collector rejected report: HTTP {status}")]
    CollectorStatus { status: u16 },

    #[error("Invalid collector URL: {0}")]
    InvalidUrl(String),
}

impl BridgeError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether a later attempt of the same operation could succeed.
    /// Reports are never retried within a tick either way; this only
    /// informs logging severity.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Report(ReportError::Transport(_)) => true,
            BridgeError::Report(ReportError::CollectorStatus { .. }) => true,
            BridgeError::Io(_) => true,
            _ => false,
        }
    }

    /// Get the error category for log fields
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::Config(_) => "config",
            BridgeError::Report(_) => "report",
            BridgeError::Io(_) => "io",
            BridgeError::Internal(_) => "internal",
        }
    }
}
