//! Global error types for the automation client.
//!
//! All error categories across the workspace are unified into a single
//! `NxError` enum with conversions from underlying library errors. Every
//! variant carries enough context (endpoint, operation id, path) for the
//! caller to decide between retry and abort.

use thiserror::Error;

/// Convenience type alias for Results using NxError.
pub type NxResult<T> = Result<T, NxError>;

/// Unified error type covering all error categories in the client.
#[derive(Error, Debug)]
pub enum NxError {
    // -- Configuration errors --
    /// Failed to load or parse client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Request assembly errors --
    /// No operation id was resolvable at execute time, neither on the
    /// descriptor nor as an execute-time override.
    #[error("no operation id for request against {url}")]
    NoOperationId {
        /// Base automation endpoint the operation targeted.
        url: String,
    },

    /// A local blob resource could not be opened or read.
    #[error("failed to load blob from {path}: {message}")]
    BlobLoad {
        /// Path of the unreadable resource.
        path: String,
        /// Underlying I/O failure.
        message: String,
    },

    // -- Network errors --
    /// Connection-level failure while talking to the automation server.
    #[error("transport error for operation {operation_id} at {url}: {message}")]
    Transport {
        /// Full request URL.
        url: String,
        /// Operation id in flight.
        operation_id: String,
        /// Underlying transport failure.
        message: String,
    },

    /// The server returned an HTTP error status.
    #[error("server error (status {status}) for operation {operation_id}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Operation id in flight.
        operation_id: String,
        /// Response body or status text.
        message: String,
    },

    // -- Response errors --
    /// A response that must be JSON could not be decoded as JSON.
    #[error("failed to decode response for operation {operation_id}: {message}")]
    Decode {
        /// Operation id in flight.
        operation_id: String,
        /// Decoder failure detail.
        message: String,
    },

    /// The decoded response payload cannot satisfy the requested result shape.
    #[error("response type mismatch: expected {expected}: {message}")]
    ResponseTypeMismatch {
        /// The Rust type the caller asked for.
        expected: String,
        /// Why the coercion failed.
        message: String,
    },

    // -- Model errors --
    /// A date string could not be parsed or names an impossible date.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Generic --
    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for NxError {
    fn from(e: serde_json::Error) -> Self {
        NxError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for NxError {
    fn from(e: toml::de::Error) -> Self {
        NxError::Config(e.to_string())
    }
}

impl NxError {
    /// Whether this error occurred before any network exchange took place.
    ///
    /// Pre-flight errors leave the request body untouched; the caller may
    /// fix the problem and execute the same operation again.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            NxError::Config(_)
                | NxError::MissingConfig(_)
                | NxError::NoOperationId { .. }
                | NxError::BlobLoad { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_context() {
        let err = NxError::Transport {
            url: "http://localhost:8080/nuxeo/site/automation/Document.Fetch".into(),
            operation_id: "Document.Fetch".into(),
            message: "connection refused".into(),
        };
        let text = err.to_string();
        assert!(text.contains("Document.Fetch"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_preflight_classification() {
        let err = NxError::NoOperationId {
            url: "http://localhost:8080".into(),
        };
        assert!(err.is_preflight());

        let err = NxError::Decode {
            operation_id: "Document.Query".into(),
            message: "unexpected end of input".into(),
        };
        assert!(!err.is_preflight());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: NxError = parse_err.into();
        assert!(matches!(err, NxError::Serialization(_)));
    }
}
