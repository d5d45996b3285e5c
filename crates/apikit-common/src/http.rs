//! HTTP transport helpers shared by the clients

use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Response;
use serde_json::Value;

use crate::error::{Error, Result};

/// Build an HTTP client with a fixed per-request timeout and default headers
pub fn build_client(timeout: Duration, headers: HeaderMap) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| Error::InvalidConfig(format!("Failed to build HTTP client: {e}")))
}

/// Join a base URL and an endpoint path with exactly one slash
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Read a response body as JSON; an empty body yields `None`
pub async fn read_json(response: Response) -> Result<Option<Value>> {
    let text = response.text().await?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|e| Error::Decode(e.to_string()))
}

/// Pass 2xx responses through; turn anything else into [`Error::Http`]
///
/// The body is parsed as JSON when possible and kept as the error detail.
pub async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail: Option<Value> = serde_json::from_str(&text).ok();
    let message = detail
        .as_ref()
        .and_then(error_message)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        });

    Err(Error::Http {
        status: status.as_u16(),
        message,
        detail,
    })
}

/// Pick the human message out of a JSON error body
fn error_message(body: &Value) -> Option<String> {
    ["message", "error", "msg", "detail", "title"]
        .iter()
        .find_map(|key| match &body[*key] {
            Value::String(s) => Some(s.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(String::from),
            _ => None,
        })
}
