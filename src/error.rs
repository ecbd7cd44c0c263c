//! Unified error types for the application.

use thiserror::Error;

/// Application-specific errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Filesystem failure while scanning, saving, or exporting.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file exists but is not valid JSON for the expected schema.
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Type alias for Results in this application.
pub type Result<T> = std::result::Result<T, AppError>;
