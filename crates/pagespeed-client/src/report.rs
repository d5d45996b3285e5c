//! Condensed Lighthouse report

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use apikit_common::{Error, Result};

/// Category scores on a 0-100 scale, one decimal
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub performance: Option<f64>,
    pub accessibility: Option<f64>,
    pub best_practices: Option<f64>,
    pub seo: Option<f64>,
    pub pwa: Option<f64>,
}

/// One Lighthouse audit measurement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Raw numeric value (milliseconds, or unitless for layout shift)
    pub value: Option<f64>,
    /// Human-readable value, e.g. "1.2 s"
    pub display: Option<String>,
    /// Audit score between 0 and 1
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub first_contentful_paint: Option<Metric>,
    pub largest_contentful_paint: Option<Metric>,
    pub total_blocking_time: Option<Metric>,
    pub cumulative_layout_shift: Option<Metric>,
    pub speed_index: Option<Metric>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSpeedReport {
    /// Final URL that was analysed
    pub url: Option<String>,
    pub scores: Scores,
    pub metrics: Metrics,
    /// Analysis timestamp as reported by the API
    pub fetch_time: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawResponse {
    id: Option<String>,
    #[serde(rename = "analysisUTCTimestamp")]
    analysis_utc_timestamp: Option<String>,
    #[serde(default)]
    lighthouse_result: RawLighthouse,
}

#[derive(Deserialize, Default)]
struct RawLighthouse {
    #[serde(default)]
    categories: HashMap<String, RawCategory>,
    #[serde(default)]
    audits: HashMap<String, RawAudit>,
}

#[derive(Deserialize)]
struct RawCategory {
    score: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAudit {
    numeric_value: Option<f64>,
    display_value: Option<String>,
    score: Option<f64>,
}

impl PageSpeedReport {
    /// Condense a raw `runPagespeed` response
    pub fn from_response(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(Error::Decode("expected a JSON object".to_string()));
        }
        let raw: RawResponse =
            serde_json::from_value(body).map_err(|e| Error::Decode(e.to_string()))?;
        let lighthouse = raw.lighthouse_result;

        let score = |name: &str| {
            lighthouse
                .categories
                .get(name)
                .and_then(|c| c.score)
                .map(to_percent)
        };
        let metric = |name: &str| {
            lighthouse.audits.get(name).map(|a| Metric {
                value: a.numeric_value,
                display: a.display_value.clone(),
                score: a.score,
            })
        };

        Ok(Self {
            url: raw.id,
            scores: Scores {
                performance: score("performance"),
                accessibility: score("accessibility"),
                best_practices: score("best-practices"),
                seo: score("seo"),
                pwa: score("pwa"),
            },
            metrics: Metrics {
                first_contentful_paint: metric("first-contentful-paint"),
                largest_contentful_paint: metric("largest-contentful-paint"),
                total_blocking_time: metric("total-blocking-time"),
                cumulative_layout_shift: metric("cumulative-layout-shift"),
                speed_index: metric("speed-index"),
            },
            fetch_time: raw.analysis_utc_timestamp,
        })
    }
}

/// 0..1 score to 0..100, rounded to one decimal
fn to_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(1.0, 100.0)]
    #[case(0.87, 87.0)]
    #[case(0.9234, 92.3)]
    fn test_to_percent(#[case] score: f64, #[case] expected: f64) {
        assert!((to_percent(score) - expected).abs() < f64::EPSILON * 100.0);
    }

    #[test]
    fn test_from_response() {
        let body = json!({
            "id": "https://example.com/",
            "analysisUTCTimestamp": "2024-05-01T10:00:00.000Z",
            "lighthouseResult": {
                "categories": {
                    "performance": {"score": 0.91},
                    "best-practices": {"score": 1},
                    "seo": {"score": null}
                },
                "audits": {
                    "first-contentful-paint": {
                        "numericValue": 1204.5,
                        "displayValue": "1.2 s",
                        "score": 0.98
                    },
                    "cumulative-layout-shift": {"numericValue": 0.01, "score": 1}
                }
            }
        });

        let report = PageSpeedReport::from_response(body).unwrap();
        assert_eq!(report.url.as_deref(), Some("https://example.com/"));
        assert_eq!(report.fetch_time.as_deref(), Some("2024-05-01T10:00:00.000Z"));
        assert_eq!(report.scores.performance, Some(91.0));
        assert_eq!(report.scores.best_practices, Some(100.0));
        assert_eq!(report.scores.accessibility, None);
        assert_eq!(report.scores.seo, None);
        assert_eq!(report.scores.pwa, None);

        let fcp = report.metrics.first_contentful_paint.unwrap();
        assert_eq!(fcp.display.as_deref(), Some("1.2 s"));
        assert_eq!(fcp.value, Some(1204.5));
        assert_eq!(report.metrics.cumulative_layout_shift.unwrap().display, None);
        assert!(report.metrics.speed_index.is_none());
    }

    #[test]
    fn test_missing_lighthouse_result_is_empty_report() {
        let report = PageSpeedReport::from_response(json!({"id": "https://a.dev/"})).unwrap();
        assert_eq!(report.scores, Scores::default());
        assert_eq!(report.metrics, Metrics::default());
    }

    #[test]
    fn test_non_object_body_is_decode_error() {
        let err = PageSpeedReport::from_response(json!(["nope"])).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse response:"));
    }
}
