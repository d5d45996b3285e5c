//! Result envelope returned by every client operation
//!
//! Callers branch on [`Envelope::is_success`] instead of matching on errors.
//! On the wire the envelope serialises to the flat shape
//! `{success, data, error?, count?, exists?}`; a failure always carries
//! `data: null`. The failure-kind, HTTP status, backend detail and context
//! fields are only emitted when present.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, Result};

static NULL: Value = Value::Null;

/// Classification of a failed operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Missing or malformed client configuration
    Config,
    /// The backend could not be reached
    Connection,
    /// The request did not complete within the configured timeout
    Timeout,
    /// The backend answered with a non-2xx status
    Backend,
    /// The backend answered but the body could not be understood
    Decode,
    /// The request was refused before it was sent
    InvalidRequest,
}

impl FailureKind {
    /// Short human description, used for log lines and CLI output
    pub fn summary(self) -> &'static str {
        match self {
            Self::Config => "configuration error",
            Self::Connection => "failed to connect to the API",
            Self::Timeout => "request timeout",
            Self::Backend => "HTTP error occurred",
            Self::Decode => "unreadable response",
            Self::InvalidRequest => "invalid request",
        }
    }
}

/// Success payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub data: Value,
    pub count: Option<u64>,
    pub exists: Option<bool>,
    pub status: Option<u16>,
}

impl Payload {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Normalise a raw backend response: absent data becomes `null`
    pub fn from_response(data: Option<Value>, count: Option<u64>) -> Self {
        Self {
            data: data.unwrap_or(Value::Null),
            count,
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: u64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_exists(mut self, exists: bool) -> Self {
        self.exists = Some(exists);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

/// Failure payload
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub kind: FailureKind,
    pub error: String,
    pub status: Option<u16>,
    pub detail: Option<Value>,
    pub context: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
            status: None,
            detail: None,
            context: None,
        }
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl From<&Error> for Failure {
    fn from(e: &Error) -> Self {
        Self {
            kind: e.kind(),
            error: e.to_string(),
            status: e.status_code(),
            detail: e.detail().cloned(),
            context: None,
        }
    }
}

/// Outcome of a client operation
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Success(Payload),
    Failure(Failure),
}

impl Envelope {
    /// Success carrying `data`
    pub fn success(data: Value) -> Self {
        Self::Success(Payload::new(data))
    }

    /// Success of a count-only query
    pub fn from_count(count: u64) -> Self {
        Self::Success(Payload::default().with_count(count))
    }

    /// Success of an existence check
    pub fn from_exists(exists: bool) -> Self {
        Self::Success(Payload::default().with_exists(exists))
    }

    pub fn failure(kind: FailureKind, error: impl Into<String>) -> Self {
        Self::Failure(Failure::new(kind, error))
    }

    /// Convert an error into a failure envelope
    pub fn from_error(e: &Error) -> Self {
        Self::Failure(Failure::from(e))
    }

    /// Fold a fallible operation into an envelope
    pub fn from_result(result: Result<Payload>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => {
                tracing::warn!(kind = ?e.kind(), error = %e, "operation failed");
                Self::from_error(&e)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returned data; always `null` for failures
    pub fn data(&self) -> &Value {
        match self {
            Self::Success(payload) => &payload.data,
            Self::Failure(_) => &NULL,
        }
    }

    pub fn into_data(self) -> Value {
        match self {
            Self::Success(payload) => payload.data,
            Self::Failure(_) => Value::Null,
        }
    }

    /// Deserialize the data into a typed value; `None` for failures and `null`
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.data() {
            Value::Null => Ok(None),
            value => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| Error::Decode(e.to_string())),
        }
    }

    pub fn count(&self) -> Option<u64> {
        self.payload().and_then(|p| p.count)
    }

    pub fn exists(&self) -> Option<bool> {
        self.payload().and_then(|p| p.exists)
    }

    pub fn error(&self) -> Option<&str> {
        self.failure_ref().map(|f| f.error.as_str())
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.failure_ref().map(|f| f.kind)
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Success(payload) => payload.status,
            Self::Failure(failure) => failure.status,
        }
    }

    pub fn payload(&self) -> Option<&Payload> {
        match self {
            Self::Success(payload) => Some(payload),
            Self::Failure(_) => None,
        }
    }

    pub fn failure_ref(&self) -> Option<&Failure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(failure),
        }
    }

    /// Attach caller context; successes are returned unchanged
    #[must_use]
    pub fn with_context(self, context: impl Into<String>) -> Self {
        match self {
            Self::Failure(mut failure) => {
                failure.context = Some(context.into());
                Self::Failure(failure)
            }
            success => success,
        }
    }

    /// Transform the data of a success
    #[must_use]
    pub fn map_data(self, f: impl FnOnce(Value) -> Value) -> Self {
        match self {
            Self::Success(mut payload) => {
                payload.data = f(payload.data);
                Self::Success(payload)
            }
            failure => failure,
        }
    }

    pub fn into_result(self) -> std::result::Result<Payload, Failure> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure(failure) => Err(failure),
        }
    }
}

impl From<Payload> for Envelope {
    fn from(payload: Payload) -> Self {
        Self::Success(payload)
    }
}

impl From<Error> for Envelope {
    fn from(e: Error) -> Self {
        Self::from_error(&e)
    }
}

#[derive(Serialize)]
struct Wire<'a> {
    success: bool,
    data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    exists: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<FailureKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_detail: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success(p) => Wire {
                success: true,
                data: &p.data,
                error: None,
                count: p.count,
                exists: p.exists,
                kind: None,
                status_code: p.status,
                error_detail: None,
                context: None,
            },
            Self::Failure(f) => Wire {
                success: false,
                data: &NULL,
                error: Some(&f.error),
                count: None,
                exists: None,
                kind: Some(f.kind),
                status_code: f.status,
                error_detail: f.detail.as_ref(),
                context: f.context.as_deref(),
            },
        };
        wire.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_wire_shape() {
        let envelope = Envelope::Success(Payload::from_response(
            Some(json!([{"id": 1}])),
            Some(1),
        ));
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire, json!({"success": true, "data": [{"id": 1}], "count": 1}));
    }

    #[test]
    fn test_failure_wire_shape() {
        let envelope = Envelope::failure(FailureKind::Connection, "connection refused");
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            wire,
            json!({
                "success": false,
                "data": null,
                "error": "connection refused",
                "kind": "connection"
            })
        );
    }

    #[test]
    fn test_exists_and_count_shapes() {
        let wire = serde_json::to_value(Envelope::from_exists(false)).unwrap();
        assert_eq!(wire, json!({"success": true, "data": null, "exists": false}));

        let wire = serde_json::to_value(Envelope::from_count(0)).unwrap();
        assert_eq!(wire, json!({"success": true, "data": null, "count": 0}));
    }

    #[test]
    fn test_from_response_defaults_to_null() {
        let payload = Payload::from_response(None, None);
        assert_eq!(payload.data, Value::Null);
        assert_eq!(payload.count, None);
    }

    #[test]
    fn test_from_error_keeps_backend_detail() {
        let err = Error::Http {
            status: 409,
            message: "duplicate key value".to_string(),
            detail: Some(json!({"code": "23505"})),
        };
        let envelope = Envelope::from_error(&err);
        assert!(!envelope.is_success());
        assert_eq!(envelope.kind(), Some(FailureKind::Backend));
        assert_eq!(envelope.status_code(), Some(409));
        assert_eq!(envelope.data(), &Value::Null);

        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["error_detail"]["code"], "23505");
    }

    #[test]
    fn test_context_only_applies_to_failures() {
        let ok = Envelope::success(json!({"a": 1})).with_context("ignored");
        assert_eq!(serde_json::to_value(&ok).unwrap().get("context"), None);

        let failed = Envelope::failure(FailureKind::Timeout, "slow").with_context("profile lookup");
        assert_eq!(failed.failure_ref().unwrap().context.as_deref(), Some("profile lookup"));
    }

    #[test]
    fn test_data_as() {
        #[derive(Deserialize)]
        struct Row {
            email: String,
        }

        let envelope = Envelope::success(json!({"email": "a@x.com"}));
        let row: Row = envelope.data_as().unwrap().unwrap();
        assert_eq!(row.email, "a@x.com");

        let empty = Envelope::success(Value::Null);
        assert!(empty.data_as::<Row>().unwrap().is_none());

        let bad = Envelope::success(json!(42));
        assert!(bad.data_as::<Row>().is_err());
    }

    #[test]
    fn test_map_data_skips_failures() {
        let failed = Envelope::failure(FailureKind::Backend, "boom").map_data(|_| json!(1));
        assert_eq!(failed.data(), &Value::Null);

        let ok = Envelope::success(json!([1, 2])).map_data(|v| v[0].clone());
        assert_eq!(ok.data(), &json!(1));
    }
}
