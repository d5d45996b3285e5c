//! PageSpeed Insights API client

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use apikit_common::http::{build_client, check_status, read_json};
use apikit_common::{Envelope, Error, Payload, Result};

use crate::config::PageSpeedConfig;
use crate::report::PageSpeedReport;

/// Device profile Lighthouse emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Mobile,
    Desktop,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            other => Err(Error::InvalidRequest(format!("unknown strategy: {other}"))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lighthouse audit category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Performance,
    Accessibility,
    BestPractices,
    Seo,
    Pwa,
}

impl Category {
    /// Categories requested when none are given
    pub const DEFAULT: [Category; 4] = [
        Category::Performance,
        Category::Accessibility,
        Category::BestPractices,
        Category::Seo,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Performance => "performance",
            Self::Accessibility => "accessibility",
            Self::BestPractices => "best-practices",
            Self::Seo => "seo",
            Self::Pwa => "pwa",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "performance" => Ok(Self::Performance),
            "accessibility" => Ok(Self::Accessibility),
            "best-practices" => Ok(Self::BestPractices),
            "seo" => Ok(Self::Seo),
            "pwa" => Ok(Self::Pwa),
            other => Err(Error::InvalidRequest(format!("unknown category: {other}"))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the `runPagespeed` endpoint
#[derive(Clone)]
pub struct PageSpeedClient {
    config: Arc<PageSpeedConfig>,
    http: reqwest::Client,
}

impl PageSpeedClient {
    pub fn new(config: PageSpeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            http: build_client(config.timeout(), HeaderMap::new())?,
            config: Arc::new(config),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(PageSpeedConfig::from_env()?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(PageSpeedConfig::from_file(path)?)
    }

    pub fn config(&self) -> &PageSpeedConfig {
        &self.config
    }

    /// Run Lighthouse against `url`
    ///
    /// An empty `categories` slice requests [`Category::DEFAULT`]. On success
    /// the envelope data is a serialised [`PageSpeedReport`].
    pub async fn analyze_url(
        &self,
        url: &str,
        strategy: Strategy,
        categories: &[Category],
    ) -> Envelope {
        Envelope::from_result(self.try_analyze(url, strategy, categories).await)
    }

    async fn try_analyze(
        &self,
        url: &str,
        strategy: Strategy,
        categories: &[Category],
    ) -> Result<Payload> {
        let categories = if categories.is_empty() {
            &Category::DEFAULT[..]
        } else {
            categories
        };

        let mut params = vec![
            ("url", url),
            ("key", self.config.api_key.as_str()),
            ("strategy", strategy.as_str()),
        ];
        params.extend(categories.iter().map(|c| ("category", c.as_str())));

        tracing::debug!(%url, %strategy, categories = categories.len(), "pagespeed request");

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await?;
        let response = check_status(response).await?;
        let status = response.status().as_u16();
        let body = read_json(response).await?.unwrap_or(Value::Null);

        let report = PageSpeedReport::from_response(body)?;
        Ok(Payload::new(serde_json::to_value(report)?).with_status(status))
    }
}

impl fmt::Debug for PageSpeedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSpeedClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mobile", Strategy::Mobile)]
    #[case("DESKTOP", Strategy::Desktop)]
    fn test_strategy_parse(#[case] raw: &str, #[case] expected: Strategy) {
        assert_eq!(raw.parse::<Strategy>().unwrap(), expected);
    }

    #[rstest]
    #[case("best-practices", Category::BestPractices)]
    #[case("best_practices", Category::BestPractices)]
    #[case("SEO", Category::Seo)]
    #[case("pwa", Category::Pwa)]
    fn test_category_parse(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(raw.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_values_rejected() {
        assert!("tablet".parse::<Strategy>().is_err());
        assert!("speed".parse::<Category>().is_err());
    }

    #[test]
    fn test_new_requires_key() {
        assert!(PageSpeedClient::new(PageSpeedConfig::new("")).is_err());
    }
}
