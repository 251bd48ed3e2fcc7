//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Required request field is absent or empty
    #[error("Missing required field: {field}")]
    MissingField {
        /// Name of the field
        field: String,
    },

    /// Language name outside the supported set
    #[error("Unsupported language: {language}. Choose from: {supported}")]
    UnsupportedLanguage {
        /// Name as given in the request
        language: String,
        /// Comma-separated supported names
        supported: String,
    },

    /// Request rejected before reaching the model
    #[error("Invalid request: {message}")]
    Validation {
        /// Details
        message: String,
    },

    /// Model server answered with an error status
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Details
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimitError {
        /// Seconds from the `Retry-After` header
        retry_after: Option<u64>,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Details
        message: String,
    },

    /// Invalid response from the model server
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// Details
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Translation backend cannot be reached or cannot load the model
    #[error("Translation backend unavailable: {message}")]
    BackendUnavailable {
        /// Details
        message: String,
    },

    /// One window of a chunked translation failed
    #[error("Chunk {index} failed to translate: {message}")]
    ChunkFailed {
        /// Position of the failed window
        index: usize,
        /// Details
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// File path
        path: String,
        /// Details
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Details
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl TranslationError {
    /// Errors caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::MissingField { .. }
                | TranslationError::UnsupportedLanguage { .. }
                | TranslationError::Validation { .. }
        )
    }

    /// Errors after which no further gateway call can succeed
    pub fn is_fatal(&self) -> bool {
        matches!(self, TranslationError::BackendUnavailable { .. })
    }

    /// Short machine-readable code used in API error payloads
    pub fn code(&self) -> &'static str {
        match self {
            TranslationError::MissingField { .. }
            | TranslationError::UnsupportedLanguage { .. }
            | TranslationError::Validation { .. } => "invalid_request",
            TranslationError::BackendUnavailable { .. } => "backend_unavailable",
            TranslationError::ChunkFailed { .. } => "chunk_failed",
            TranslationError::ConfigError { .. } => "configuration_error",
            TranslationError::RateLimitError { .. } => "rate_limited",
            TranslationError::TimeoutError => "timeout",
            _ => "translation_error",
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let missing = TranslationError::MissingField {
            field: "text".to_string(),
        };
        assert!(missing.is_client_error());
        assert!(!missing.is_fatal());
        assert_eq!(missing.code(), "invalid_request");

        let down = TranslationError::BackendUnavailable {
            message: "connection refused".to_string(),
        };
        assert!(down.is_fatal());
        assert!(!down.is_client_error());

        assert!(!TranslationError::TimeoutError.is_fatal());
        assert_eq!(TranslationError::TimeoutError.code(), "timeout");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: TranslationError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "Internal error: boom");
    }
}
