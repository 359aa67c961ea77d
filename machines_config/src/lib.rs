#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the machines client.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section is optional; a missing file means defaults everywhere.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Backend address the original deployment shipped with.
pub const DEFAULT_BACKEND_URL: &str = "http://192.168.113.215:8080";

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Api {
    /// Base URL of the machines backend (http or https).
    pub backend_url: String,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Re-read the machine after a successful command instead of trusting
    /// the optimistic local update alone.
    pub refresh_after_command: bool,
}

impl Default for Api {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            timeout_ms: 5000,
            refresh_after_command: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Session {
    /// Where the session token is kept between invocations.
    pub token_file: PathBuf,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from(".machines/token"),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub api: Api,
    pub session: Session,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse `path`; a missing file yields the default config.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {}: {}", path.display(), e))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Api
        if self.api.backend_url.trim().is_empty() {
            eyre::bail!("api.backend_url must not be empty");
        }
        let url = url::Url::parse(&self.api.backend_url)
            .map_err(|e| eyre::eyre!("api.backend_url is not a valid URL: {e}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            eyre::bail!("api.backend_url must use http or https");
        }
        if url.query().is_some() || url.fragment().is_some() {
            eyre::bail!("api.backend_url must not carry a query or fragment");
        }
        if self.api.timeout_ms == 0 {
            eyre::bail!("api.timeout_ms must be >= 1");
        }
        if self.api.timeout_ms > 10 * 60 * 1000 {
            eyre::bail!("api.timeout_ms is unreasonably large (>10min)");
        }

        // Session
        if self.session.token_file.as_os_str().is_empty() {
            eyre::bail!("session.token_file must not be empty");
        }

        // Logging
        if let Some(level) = &self.logging.level
            && !matches!(
                level.to_ascii_lowercase().as_str(),
                "error" | "warn" | "info" | "debug" | "trace"
            )
        {
            eyre::bail!("logging.level must be one of error|warn|info|debug|trace");
        }
        if let Some(rotation) = &self.logging.rotation
            && !matches!(rotation.as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = load_toml("").unwrap();
        assert_eq!(cfg.api.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(cfg.api.timeout_ms, 5000);
        assert!(!cfg.api.refresh_after_command);
        assert_eq!(cfg.session.token_file, PathBuf::from(".machines/token"));
        cfg.validate().unwrap();
    }

    #[test]
    fn unknown_rotation_is_rejected() {
        let cfg = load_toml("[logging]\nrotation = \"weekly\"\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("logging.rotation"));
    }
}
