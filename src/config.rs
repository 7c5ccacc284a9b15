//! # Configuration Module
//!
//! Client configuration shared by the CLI and library consumers: which
//! backend to talk to, how long to wait for a response, and the default
//! resize target.

use std::time::Duration;

/// Configuration for a caption client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the captioning backend, e.g. `http://127.0.0.1:8000`.
    pub server: String,

    /// Per-request timeout in seconds. There is no retry or backoff; a
    /// timed-out operation is simply reported and may be retried by hand.
    pub timeout_secs: u64,

    /// Max-side value used when a resize is requested without one.
    pub default_max_side: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
            default_max_side: 1024,
        }
    }
}

impl ClientConfig {
    pub fn new(server: String, timeout_secs: u64, default_max_side: u32) -> Self {
        Self {
            server,
            timeout_secs,
            default_max_side,
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if !self.server.starts_with("http://") && !self.server.starts_with("https://") {
            return Err("Server must be an http:// or https:// URL".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("Timeout must be greater than 0 seconds".to_string());
        }
        if self.default_max_side == 0 {
            return Err("Default max side must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
