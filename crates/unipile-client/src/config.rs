//! Configuration for the Unipile client

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use apikit_common::config::{self as cfg, timeout_from_secs};
use apikit_common::Result;

/// Default Unipile API host
pub const DEFAULT_API_URL: &str = "https://api4.unipile.com:13443";

const DSN_HINT: &str = "Set it to your Unipile DSN.";

/// Unipile API configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnipileConfig {
    /// Access token sent as `X-API-KEY`
    pub dsn: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

impl UnipileConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            api_url: default_api_url(),
            timeout: default_timeout(),
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Reads `UNIPILE_DSN`, `UNIPILE_API_URL` and `UNIPILE_TIMEOUT`
    pub fn from_env() -> Result<Self> {
        let config = Self {
            dsn: cfg::require_env("UNIPILE_DSN", DSN_HINT)?,
            api_url: cfg::env_or("UNIPILE_API_URL", DEFAULT_API_URL),
            timeout: cfg::env_parse("UNIPILE_TIMEOUT", default_timeout())?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = cfg::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        cfg::require_non_empty(&self.dsn, "dsn", DSN_HINT)?;
        cfg::require_non_empty(&self.api_url, "api_url", "Set it to the Unipile API URL.")?;
        timeout_from_secs(self.timeout)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
