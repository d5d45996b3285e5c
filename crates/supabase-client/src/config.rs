//! Configuration for the Supabase client

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use apikit_common::config::{self as cfg, timeout_from_secs};
use apikit_common::Result;

const URL_HINT: &str = "Set it to your Supabase project URL.";
const KEY_HINT: &str = "Set it to your Supabase anon or service role key.";

/// Supabase project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://xyzcompany.supabase.co`
    pub url: String,
    /// Anon or service-role key
    pub key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Exposed database schema (default: "public")
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default = "default_true")]
    pub auto_refresh_token: bool,
    #[serde(default = "default_true")]
    pub persist_session: bool,
}

fn default_timeout() -> u64 {
    30
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_true() -> bool {
    true
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            timeout: default_timeout(),
            schema: default_schema(),
            auto_refresh_token: true,
            persist_session: true,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Reads `SUPABASE_URL`, `SUPABASE_KEY`, `SUPABASE_TIMEOUT` (default 30)
    /// and `SUPABASE_SCHEMA` (default "public").
    pub fn from_env() -> Result<Self> {
        let url = cfg::require_env("SUPABASE_URL", URL_HINT)?;
        let key = cfg::require_env("SUPABASE_KEY", KEY_HINT)?;
        let timeout = cfg::env_parse("SUPABASE_TIMEOUT", default_timeout())?;
        let schema = cfg::env_or("SUPABASE_SCHEMA", "public");

        let config = Self {
            timeout,
            schema,
            ..Self::new(url, key)
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML or JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config: Self = cfg::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        cfg::require_non_empty(&self.url, "url", URL_HINT)?;
        cfg::require_non_empty(&self.key, "key", KEY_HINT)?;
        timeout_from_secs(self.timeout)?;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// PostgREST root for this project
    pub fn rest_url(&self) -> String {
        apikit_common::http::join_url(&self.url, "rest/v1")
    }
}
