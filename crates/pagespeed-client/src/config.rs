//! Configuration for the PageSpeed client

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use apikit_common::config::{self as cfg, timeout_from_secs};
use apikit_common::Result;

/// Public `runPagespeed` endpoint
pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

const KEY_HINT: &str = "Set it to your Google PageSpeed Insights API key.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpeedConfig {
    pub api_key: String,
    /// Full `runPagespeed` URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds; Lighthouse runs are slow (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}

impl PageSpeedConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            timeout: default_timeout(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `PAGESPEED_API_KEY` and `PAGESPEED_TIMEOUT`
    pub fn from_env() -> Result<Self> {
        let config = Self {
            timeout: cfg::env_parse("PAGESPEED_TIMEOUT", default_timeout())?,
            ..Self::new(cfg::require_env("PAGESPEED_API_KEY", KEY_HINT)?)
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
        cfg::require_non_empty(&self.api_key, "api_key", KEY_HINT)?;
        timeout_from_secs(self.timeout)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}
