//! # Error Handling
//!
//! Domain errors for the caption client. Every failure that reaches the
//! session controller is converted into a user-visible status message, so
//! the `Display` impls here are written as the strings an operator sees:
//! HTTP failures carry the server-provided `detail`/`message` when present
//! and fall back to `HTTP {status}` otherwise.

use std::{error::Error as StdError, fmt};

/// Base error type for the caption client.
#[derive(Debug)]
pub enum ClientError {
    /// Non-2xx HTTP response. `detail` is already the display string
    /// (server-provided message or the `HTTP {status}` fallback).
    Http { status: u16, detail: String },
    /// Transport-level failure (connection refused, timeout, DNS, ...).
    Network {
        operation: String,
        source: reqwest::Error,
    },
    /// Response body could not be decoded as the expected JSON shape.
    Json {
        operation: String,
        source: serde_json::Error,
    },
    /// Configuration validation failure.
    Config { field: String, reason: String },
    /// Operation attempted in a state that does not allow it.
    State {
        current_state: String,
        attempted_operation: String,
    },
}

impl ClientError {
    /// Create an HTTP error from a status and resolved display detail.
    pub fn http(status: u16, detail: impl Into<String>) -> Self {
        Self::Http {
            status,
            detail: detail.into(),
        }
    }

    /// Create a network error.
    pub fn network(operation: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            operation: operation.into(),
            source,
        }
    }

    /// Create a JSON decode error.
    pub fn json(operation: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            operation: operation.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a state error.
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
        }
    }

    /// Get the error category as a string.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Http { .. } => "http",
            Self::Network { .. } => "network",
            Self::Json { .. } => "json",
            Self::Config { .. } => "config",
            Self::State { .. } => "state",
        }
    }

    /// HTTP status code, when this error came from a non-2xx response.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Http { detail, .. } => write!(f, "{detail}"),
            ClientError::Network { operation, source } => {
                write!(f, "Network error during {operation}: {source}")
            }
            ClientError::Json { operation, source } => {
                write!(f, "Unexpected response during {operation}: {source}")
            }
            ClientError::Config { field, reason } => {
                write!(f, "Configuration error in '{field}': {reason}")
            }
            ClientError::State {
                current_state,
                attempted_operation,
            } => {
                write!(f, "Cannot {attempted_operation} while {current_state}")
            }
        }
    }
}

impl StdError for ClientError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Network { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias using the client error type.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_resolved_detail() {
        let error = ClientError::http(404, "Dataset not found");
        assert_eq!(error.to_string(), "Dataset not found");
        assert_eq!(error.category(), "http");
        assert_eq!(error.status(), Some(404));
    }

    #[test]
    fn state_error_names_the_blocked_operation() {
        let error = ClientError::state("no dataset loaded", "apply crop");
        assert_eq!(
            error.to_string(),
            "Cannot apply crop while no dataset loaded"
        );
        assert_eq!(error.status(), None);
    }
}
