//! Error types for keepwarm

use thiserror::Error;

/// Result type alias for keepwarm operations
pub type WarmResult<T> = Result<T, WarmError>;

/// Main error type for keepwarm
///
/// These errors surface from setup paths (loading configuration or a
/// payload, building a backend, constructing a warmer). Nothing in the
/// warming loop itself returns a `WarmError` to the caller.
#[derive(Error, Debug)]
pub enum WarmError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// No tokio runtime available to host the warming loop
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WarmError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime(message.into())
    }
}

impl From<toml::de::Error> for WarmError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid TOML: {}", err))
    }
}

/// Failure of a single keep-alive ping.
///
/// Every variant is non-fatal to the warming loop; it is reported once
/// through the reporter and the loop waits for the next scheduled ping.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The request never produced an HTTP response (DNS, connect, timeout, TLS)
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("{provider} API error (status {status}): {message}")]
    Api {
        provider: String,
        status: u16,
        message: String,
    },

    /// The backend answered 2xx but the body could not be understood
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn api(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Short machine-readable label, used as a tracing field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Api { .. } => "api",
            Self::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_display() {
        let err = BackendError::api("Anthropic", 529, "overloaded");
        assert_eq!(
            err.to_string(),
            "Anthropic API error (status 529): overloaded"
        );
        assert_eq!(err.kind(), "api");

        let err = BackendError::transport("connection refused");
        assert_eq!(err.to_string(), "transport error: connection refused");
        assert_eq!(err.kind(), "transport");
    }

    #[test]
    fn test_toml_error_becomes_config_error() {
        let parse: Result<toml::Value, _> = toml::from_str("ping_count = [");
        let err: WarmError = parse.unwrap_err().into();
        assert!(matches!(err, WarmError::Config(_)));
    }
}
