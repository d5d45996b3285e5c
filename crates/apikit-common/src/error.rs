//! Error types for apikit
//!
//! Every client crate reports failures through this type. Data operations
//! never hand it to callers directly; they fold it into a failure
//! [`Envelope`](crate::Envelope). Only configuration errors escape as `Err`.

use serde_json::Value;
use thiserror::Error;

use crate::envelope::FailureKind;

/// Result type alias using apikit's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for apikit clients
#[derive(Error, Debug)]
pub enum Error {
    // Configuration Errors
    #[error("{key} is required. {hint}")]
    MissingConfig { key: String, hint: String },

    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    // Transport Errors
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout: {0}")]
    Timeout(String),

    // Backend Errors
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        detail: Option<Value>,
    },

    #[error("Failed to parse response: {0}")]
    Decode(String),

    // Caller Errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Shorthand for a missing required setting
    pub fn missing(key: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingConfig {
            key: key.into(),
            hint: hint.into(),
        }
    }

    /// Failure class reported in envelopes
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingConfig { .. } | Self::InvalidConfig(_) => FailureKind::Config,
            Self::Connection(_) | Self::Io(_) => FailureKind::Connection,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Http { .. } => FailureKind::Backend,
            Self::Decode(_) | Self::Json(_) => FailureKind::Decode,
            Self::InvalidRequest(_) => FailureKind::InvalidRequest,
        }
    }

    /// HTTP status reported by the backend, if the request got that far
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Structured error body returned by the backend
    pub fn detail(&self) -> Option<&Value> {
        match self {
            Self::Http { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

/// Classify a transport error
///
/// The request URL is stripped first; query strings may carry API keys.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_connect() {
            Self::Connection(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else if e.is_builder() {
            Self::InvalidRequest(e.to_string())
        } else if let Some(status) = e.status() {
            Self::Http {
                status: status.as_u16(),
                message: e.to_string(),
                detail: None,
            }
        } else {
            Self::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(Error::missing("X", "Set X.").kind(), FailureKind::Config);
        assert_eq!(Error::Timeout("slow".into()).kind(), FailureKind::Timeout);
        assert_eq!(
            Error::Connection("refused".into()).kind(),
            FailureKind::Connection
        );
        assert_eq!(
            Error::InvalidRequest("no filters".into()).kind(),
            FailureKind::InvalidRequest
        );
    }

    #[test]
    fn test_http_error_carries_status_and_detail() {
        let err = Error::Http {
            status: 404,
            message: "relation \"nope\" does not exist".to_string(),
            detail: Some(serde_json::json!({"code": "42P01"})),
        };
        assert_eq!(err.kind(), FailureKind::Backend);
        assert_eq!(err.status_code(), Some(404));
        assert_eq!(err.detail().unwrap()["code"], "42P01");
        assert_eq!(err.to_string(), "HTTP 404: relation \"nope\" does not exist");
    }

    #[test]
    fn test_missing_config_message() {
        let err = Error::missing(
            "SUPABASE_URL environment variable",
            "Set it to your Supabase project URL.",
        );
        assert_eq!(
            err.to_string(),
            "SUPABASE_URL environment variable is required. Set it to your Supabase project URL."
        );
    }
}
