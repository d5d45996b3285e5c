//! Query execution backends
//!
//! [`Backend`] is the seam between the query builder and whatever actually
//! runs the query. [`PostgrestBackend`] talks to a Supabase project over
//! HTTP; [`MemoryBackend`] evaluates the same requests against an in-process
//! table store for development and testing.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_RANGE};
use reqwest::Method;
use serde_json::Value;

use apikit_common::http::{build_client, check_status, join_url, read_json};
use apikit_common::{Error, Result};

use crate::config::SupabaseConfig;
use crate::query::{Operation, QueryRequest};

pub use crate::memory::MemoryBackend;

/// Raw outcome of an executed query
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse {
    /// Rows (or confirmation payload) returned by the backend
    pub data: Option<Value>,
    /// Total matching rows, when a count was requested
    pub count: Option<u64>,
    /// HTTP status of the response
    pub status: u16,
}

/// Unified query interface
///
/// Implementations must treat filters conjunctively and apply clauses in
/// the order filters, order, limit, offset.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn execute(&self, request: &QueryRequest) -> Result<BackendResponse>;
}

/// HTTP backend speaking the PostgREST dialect
pub struct PostgrestBackend {
    http: reqwest::Client,
    rest_url: String,
    schema: String,
}

impl PostgrestBackend {
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.key)?);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            header_value(&format!("Bearer {}", config.key))?,
        );

        Ok(Self {
            http: build_client(config.timeout(), headers)?,
            rest_url: config.rest_url(),
            schema: config.schema.clone(),
        })
    }

    fn method_for(request: &QueryRequest) -> Method {
        match request.operation {
            Operation::Select if request.head => Method::HEAD,
            Operation::Select => Method::GET,
            Operation::Insert(_) => Method::POST,
            Operation::Update(_) => Method::PATCH,
            Operation::Delete => Method::DELETE,
        }
    }
}

#[async_trait::async_trait]
impl Backend for PostgrestBackend {
    async fn execute(&self, request: &QueryRequest) -> Result<BackendResponse> {
        let url = join_url(&self.rest_url, &request.table);
        let method = Self::method_for(request);

        tracing::debug!(%method, %url, "postgrest request");

        let mut builder = self
            .http
            .request(method, &url)
            .query(&request.to_query_pairs());

        if let Some(prefer) = request.prefer_header() {
            builder = builder.header("Prefer", prefer);
        }

        if self.schema != "public" {
            let profile = if request.is_mutation() {
                "Content-Profile"
            } else {
                "Accept-Profile"
            };
            builder = builder.header(profile, &self.schema);
        }

        builder = match &request.operation {
            Operation::Insert(rows) => builder.json(rows),
            Operation::Update(fields) => builder.json(fields),
            Operation::Select | Operation::Delete => builder,
        };

        let response = check_status(builder.send().await?).await?;
        let status = response.status().as_u16();
        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        let data = read_json(response).await?;

        Ok(BackendResponse {
            data,
            count,
            status,
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| Error::InvalidConfig(format!("key is not a valid header value: {e}")))
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`
pub fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}
