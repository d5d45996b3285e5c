//! Configuration loading helpers
//!
//! Client configs are plain serde structs. These helpers read them from the
//! environment or from a TOML/JSON file and enforce the fail-fast rule:
//! a required credential is never silently defaulted.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

/// Read a required environment variable, rejecting unset and blank values
pub fn require_env(key: &str, hint: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(Error::missing(format!("{key} environment variable"), hint)),
    }
}

/// Read an optional environment variable, falling back to `default`
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Read and parse an optional environment variable
pub fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| Error::InvalidConfig(format!("{key}={raw:?} is not valid: {e}"))),
        _ => Ok(default),
    }
}

/// Reject a blank required setting
pub fn require_non_empty(value: &str, key: &str, hint: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::missing(key, hint));
    }
    Ok(())
}

/// Validate and convert a timeout expressed in seconds
pub fn timeout_from_secs(secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(Error::InvalidConfig(
            "timeout must be at least one second".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

/// Load configuration from a TOML or JSON file
pub fn load_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::InvalidConfig(format!("Failed to read config file: {e}")))?;

    if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse TOML config: {e}")))
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse JSON config: {e}")))
    }
}
