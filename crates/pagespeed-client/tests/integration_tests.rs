//! Integration tests for the PageSpeed client

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use pagespeed_client::{
    Category, FailureKind, PageSpeedClient, PageSpeedConfig, PageSpeedReport, Strategy,
};

fn client_for(server: &MockServer) -> PageSpeedClient {
    let config = PageSpeedConfig::new("test-key")
        .with_base_url(format!("{}/pagespeedonline/v5/runPagespeed", server.uri()));
    PageSpeedClient::new(config).unwrap()
}

fn lighthouse_body() -> serde_json::Value {
    json!({
        "id": "https://example.com/",
        "analysisUTCTimestamp": "2024-05-01T10:00:00.000Z",
        "lighthouseResult": {
            "categories": {
                "performance": {"score": 0.72},
                "accessibility": {"score": 0.95},
                "best-practices": {"score": 0.83},
                "seo": {"score": 0.9}
            },
            "audits": {
                "largest-contentful-paint": {
                    "numericValue": 3120.0,
                    "displayValue": "3.1 s",
                    "score": 0.41
                },
                "total-blocking-time": {
                    "numericValue": 180.0,
                    "displayValue": "180 ms",
                    "score": 0.9
                }
            }
        }
    })
}

#[tokio::test]
async fn test_analyze_sends_every_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/pagespeedonline/v5/runPagespeed"))
        .and(query_param("url", "https://example.com/"))
        .and(query_param("key", "test-key"))
        .and(query_param("strategy", "mobile"))
        .and(|req: &Request| {
            let categories: Vec<String> = req
                .url
                .query_pairs()
                .filter(|(k, _)| k == "category")
                .map(|(_, v)| v.into_owned())
                .collect();
            categories == ["performance", "accessibility", "best-practices", "seo"]
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_body()))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .analyze_url("https://example.com/", Strategy::Mobile, &[])
        .await;

    assert!(envelope.is_success());
    let report: PageSpeedReport = envelope.data_as().unwrap().unwrap();
    assert_eq!(report.scores.performance, Some(72.0));
    assert_eq!(report.scores.seo, Some(90.0));
    assert_eq!(
        report.metrics.largest_contentful_paint.unwrap().display.as_deref(),
        Some("3.1 s")
    );
    assert!(report.metrics.first_contentful_paint.is_none());
}

#[tokio::test]
async fn test_analyze_desktop_single_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("strategy", "desktop"))
        .and(query_param("category", "seo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lighthouse_body()))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .analyze_url("https://example.com/", Strategy::Desktop, &[Category::Seo])
        .await;
    assert!(envelope.is_success());
}

#[tokio::test]
async fn test_api_error_is_failure_envelope() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .analyze_url("https://example.com/", Strategy::Mobile, &[])
        .await;

    assert!(!envelope.is_success());
    assert_eq!(envelope.kind(), Some(FailureKind::Backend));
    assert_eq!(envelope.status_code(), Some(400));
    assert!(envelope.error().unwrap().contains("API key not valid"));
}

#[tokio::test]
async fn test_unparseable_body_is_decode_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .analyze_url("https://example.com/", Strategy::Mobile, &[])
        .await;

    assert_eq!(envelope.kind(), Some(FailureKind::Decode));
    assert!(envelope
        .error()
        .unwrap()
        .starts_with("Failed to parse response:"));
}

#[tokio::test]
async fn test_transport_failure_does_not_leak_key() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = PageSpeedConfig::new("SECRET-API-KEY-123")
        .with_base_url(format!("http://{addr}/runPagespeed"));
    let envelope = PageSpeedClient::new(config)
        .unwrap()
        .analyze_url("https://example.com/", Strategy::Mobile, &[])
        .await;

    assert_eq!(envelope.kind(), Some(FailureKind::Connection));
    assert!(!envelope.error().unwrap().contains("SECRET-API-KEY-123"));
    let wire = serde_json::to_string(&envelope).unwrap();
    assert!(!wire.contains("SECRET-API-KEY-123"));
}

#[tokio::test]
async fn test_pwa_score_reported() {
    let server = MockServer::start().await;
    let mut body = lighthouse_body();
    body["lighthouseResult"]["categories"]["pwa"] = json!({"score": 0.5});

    Mock::given(method("GET"))
        .and(query_param("category", "pwa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let envelope = client_for(&server)
        .analyze_url("https://example.com/", Strategy::Mobile, &[Category::Pwa])
        .await;
    let report: PageSpeedReport = envelope.data_as().unwrap().unwrap();
    assert_eq!(report.scores.pwa, Some(50.0));
}
