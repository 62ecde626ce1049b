//! Error types for sonar-export

use thiserror::Error;

/// Main error type for export operations
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("API request {endpoint} returned HTTP {status}")]
    ApiError { endpoint: String, status: u16 },

    #[error("Malformed response from {context}: {reason}")]
    MalformedResponse { context: String, reason: String },

    #[error("Output error: {0}")]
    SinkError(String),

    #[error("Export exceeded run budget of {0} seconds")]
    RunTimeout(u64),
}

impl ExportError {
    pub(crate) fn malformed(context: impl Into<String>, reason: impl Into<String>) -> Self {
        ExportError::MalformedResponse {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;
