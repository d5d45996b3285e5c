//! HTTP client for the Unipile API

use std::path::Path;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Method;
use serde_json::Value;

use apikit_common::http::{build_client, check_status, join_url, read_json};
use apikit_common::{Envelope, Error, Payload, Result};

use crate::config::UnipileConfig;

/// Authenticated Unipile session
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct UnipileClient {
    config: Arc<UnipileConfig>,
    http: reqwest::Client,
}

impl UnipileClient {
    pub fn new(config: UnipileConfig) -> Result<Self> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let api_key = HeaderValue::from_str(&config.dsn)
            .map_err(|e| Error::InvalidConfig(format!("dsn is not a valid header value: {e}")))?;
        headers.insert("X-API-KEY", api_key);

        Ok(Self {
            http: build_client(config.timeout(), headers)?,
            config: Arc::new(config),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(UnipileConfig::from_env()?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(UnipileConfig::from_file(path)?)
    }

    pub fn config(&self) -> &UnipileConfig {
        &self.config
    }

    pub async fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Envelope {
        self.request(Method::GET, endpoint, params, None).await
    }

    pub async fn post(
        &self,
        endpoint: &str,
        body: Option<&Value>,
        params: &[(&str, &str)],
    ) -> Envelope {
        self.request(Method::POST, endpoint, params, body).await
    }

    /// `GET /api/v1/users/me` succeeds
    pub async fn test_connection(&self) -> bool {
        self.get("/api/v1/users/me", &[]).await.is_success()
    }

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Envelope {
        Envelope::from_result(self.send(method, endpoint, params, body).await)
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Payload> {
        let url = join_url(&self.config.api_url, endpoint);
        tracing::debug!(%method, %url, params = params.len(), "unipile request");

        let mut builder = self.http.request(method, &url).query(params);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = check_status(builder.send().await?).await?;
        let status = response.status().as_u16();
        let data = read_json(response).await?;

        Ok(Payload::from_response(data, None).with_status(status))
    }
}

impl std::fmt::Debug for UnipileClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnipileClient")
            .field("api_url", &self.config.api_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}
