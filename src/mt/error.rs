use std::path::PathBuf;
use thiserror::Error;

/// Error types for the machine translation pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// The provider answered with a non-success status, or the request never completed
    #[error("{provider} API error: {message}")]
    UpstreamError { provider: String, message: String },

    /// The provider answered successfully but the body could not be understood
    #[error("Invalid response from {provider}: {message}")]
    ResponseFormatError { provider: String, message: String },

    /// The provider returned a different number of texts than it was sent
    #[error(
        "Mismatch in number of translated texts returned by {provider}: expected {expected}, got {actual}"
    )]
    CountMismatchError {
        provider: String,
        expected: usize,
        actual: usize,
    },

    /// No driver is registered under this name
    #[error("Driver [{0}] not supported.")]
    UnsupportedDriverError(String),

    /// The scan output is missing or unreadable
    #[error("{0}")]
    MissingArtifactError(String),

    /// Malformed language code
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    /// Missing credentials or an unreadable configuration file
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading or writing a language file failed
    #[error("Catalog error at '{}': {message}", path.display())]
    CatalogError { path: PathBuf, message: String },

    /// The run was cancelled before all batches completed
    #[error("Translation run was cancelled")]
    Cancelled,
}

impl MtError {
    pub fn upstream(provider: &str, message: impl Into<String>) -> Self {
        MtError::UpstreamError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn response_format(provider: &str, message: impl Into<String>) -> Self {
        MtError::ResponseFormatError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    pub fn catalog(path: impl Into<PathBuf>, message: impl std::fmt::Display) -> Self {
        MtError::CatalogError {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether retrying the same request could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, MtError::UpstreamError { .. })
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
