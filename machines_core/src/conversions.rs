//! `From` implementations bridging `machines_config` types to `machines_core` types.

use std::time::Duration;

use crate::config::ApiSettings;

impl From<&machines_config::Api> for ApiSettings {
    fn from(c: &machines_config::Api) -> Self {
        Self {
            backend_url: c.backend_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_millis(c.timeout_ms),
            refresh_after_command: c.refresh_after_command,
        }
    }
}

impl TryFrom<&machines_config::Config> for ApiSettings {
    type Error = eyre::Report;

    /// Validates the whole config before taking the API section out of it.
    fn try_from(c: &machines_config::Config) -> Result<Self, Self::Error> {
        c.validate()?;
        Ok(Self::from(&c.api))
    }
}
