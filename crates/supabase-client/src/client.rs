//! Connection handle for a Supabase project

use std::path::Path;
use std::sync::Arc;

use apikit_common::{Error, Result};

use crate::backend::{Backend, PostgrestBackend};
use crate::config::SupabaseConfig;
use crate::query::TableQuery;

/// Authenticated handle shared by every service
///
/// Cloning is cheap; clones share the configuration and the backend.
#[derive(Clone)]
pub struct SupabaseClient {
    config: Arc<SupabaseConfig>,
    backend: Arc<dyn Backend>,
}

impl SupabaseClient {
    /// Connect over HTTP using `config`
    pub fn new(config: SupabaseConfig) -> Result<Self> {
        config.validate()?;
        let backend = PostgrestBackend::new(&config)?;
        tracing::debug!(url = %config.url, schema = %config.schema, "supabase client ready");
        Ok(Self {
            config: Arc::new(config),
            backend: Arc::new(backend),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(SupabaseConfig::from_file(path)?)
    }

    /// Run queries against a custom backend, e.g. [`MemoryBackend`](crate::MemoryBackend)
    pub fn with_backend(config: SupabaseConfig, backend: Arc<dyn Backend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Start a query against `name`
    pub fn table(&self, name: &str) -> TableQuery {
        TableQuery::new(Arc::clone(&self.backend), name)
    }

    /// Probe the project with an empty read of a placeholder table
    ///
    /// Any answer below 500 other than 401/403 means the project is reachable
    /// with these credentials. Never fails.
    pub async fn test_connection(&self) -> bool {
        let probe = self.table("_test_").select("*").limit(0).execute().await;
        match probe {
            Ok(_) => true,
            Err(Error::Http { status, .. }) => status < 500 && status != 401 && status != 403,
            Err(e) => {
                tracing::warn!(error = %e, "connection test failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("url", &self.config.url)
            .field("schema", &self.config.schema)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn probe_with_status(status: u16) -> bool {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/_test_"))
            .and(query_param("select", "*"))
            .and(query_param("limit", "0"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let client = SupabaseClient::new(SupabaseConfig::new(server.uri(), "anon")).unwrap();
        client.test_connection().await
    }

    #[tokio::test]
    async fn test_connection_status_classes() {
        assert!(probe_with_status(200).await);
        assert!(probe_with_status(404).await);
        assert!(!probe_with_status(401).await);
        assert!(!probe_with_status(403).await);
        assert!(!probe_with_status(503).await);
    }

    #[tokio::test]
    async fn test_connection_unreachable() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            SupabaseClient::new(SupabaseConfig::new(format!("http://{addr}"), "anon")).unwrap();
        assert!(!client.test_connection().await);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let err = SupabaseClient::new(SupabaseConfig::new("", "anon")).unwrap_err();
        assert!(matches!(err, Error::MissingConfig { .. }));
    }

    #[test]
    fn test_debug_hides_key() {
        let client = SupabaseClient::new(SupabaseConfig::new("https://x.supabase.co", "secret"))
            .unwrap();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
