//! Runtime settings for the client.
//!
//! This is the immutable value injected into the client and, through it, into
//! every view. It is separate from the TOML-deserialized config in
//! `machines_config`; see `conversions` for the mapping.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiSettings {
    /// Base URL of the backend, without a trailing slash.
    pub backend_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Re-read the machine after a successful command.
    pub refresh_after_command: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            backend_url: machines_config::DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_millis(5000),
            refresh_after_command: false,
        }
    }
}
