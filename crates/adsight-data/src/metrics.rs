//! Derived-metric calculation over arbitrary record arrays.
//!
//! Zero-denominator rule used everywhere in this crate: a ratio whose
//! denominator is zero is exactly `0.0` — never NaN, never an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `numerator / denominator`, or `0.0` when the denominator is zero.
#[must_use]
pub(crate) fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Round to a whole number (used for VND amounts: CPC, CPA).
#[must_use]
pub(crate) fn round0(value: f64) -> f64 {
    value.round()
}

/// Round to two decimals (used for CTR, ROAS).
#[must_use]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Errors from the calculator's string boundary.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid JSON input")]
    InvalidJson(#[from] serde_json::Error),
}

/// One input record. Missing fields read as zero; unknown fields are
/// ignored, so aggregated engine rows can be fed back in unchanged.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct MetricsInput {
    pub clicks: u64,
    pub impressions: u64,
    pub cost: u64,
    pub conversions: u64,
    pub revenue: u64,
}

/// A calculation request: records plus the subset of ratios to compute.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsRequest {
    #[serde(default)]
    pub data: Vec<MetricsInput>,
    #[serde(default = "default_metric_names")]
    pub metrics: Vec<String>,
}

fn default_metric_names() -> Vec<String> {
    vec!["cpc".to_string(), "roas".to_string(), "cpa".to_string()]
}

/// Only the requested ratios are present; the rest serialize as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestedMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roas: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roi: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsTotals {
    pub clicks: u64,
    pub impressions: u64,
    pub cost: u64,
    pub revenue: u64,
    pub conversions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatedMetrics {
    pub metrics: RequestedMetrics,
    pub totals: MetricsTotals,
}

/// Parses a JSON request and computes the requested metrics.
///
/// # Errors
///
/// Returns [`MetricsError::InvalidJson`] when `raw` is not a JSON object of
/// the expected shape. Callers that must never fail (the response composer)
/// map this to the documented `{"error": "Invalid JSON input"}` payload.
pub fn calculate_metrics(raw: &str) -> Result<CalculatedMetrics, MetricsError> {
    let request: MetricsRequest = serde_json::from_str(raw)?;
    Ok(compute_metrics(&request.data, &request.metrics))
}

/// The pure core: sums the inputs and derives only the requested ratios.
/// Unrecognized metric names are ignored.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_metrics(data: &[MetricsInput], requested: &[String]) -> CalculatedMetrics {
    let totals = MetricsTotals {
        clicks: data.iter().map(|d| d.clicks).sum(),
        impressions: data.iter().map(|d| d.impressions).sum(),
        cost: data.iter().map(|d| d.cost).sum(),
        revenue: data.iter().map(|d| d.revenue).sum(),
        conversions: data.iter().map(|d| d.conversions).sum(),
    };

    let clicks = totals.clicks as f64;
    let impressions = totals.impressions as f64;
    let cost = totals.cost as f64;
    let revenue = totals.revenue as f64;
    let conversions = totals.conversions as f64;

    let mut metrics = RequestedMetrics::default();
    for name in requested {
        match name.to_lowercase().as_str() {
            "cpc" => metrics.cpc = Some(safe_ratio(cost, clicks)),
            "ctr" => metrics.ctr = Some(safe_ratio(clicks, impressions) * 100.0),
            "roas" => metrics.roas = Some(safe_ratio(revenue, cost)),
            "cpa" => metrics.cpa = Some(safe_ratio(cost, conversions)),
            "roi" => metrics.roi = Some(safe_ratio(revenue - cost, cost) * 100.0),
            other => tracing::debug!(metric = other, "ignoring unrecognized metric name"),
        }
    }

    CalculatedMetrics { metrics, totals }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_metrics() -> Vec<String> {
        ["cpc", "ctr", "roas", "cpa", "roi"]
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn zero_records_yield_zero_ratios_for_every_metric() {
        let result = compute_metrics(&[], &all_metrics());
        assert_eq!(result.metrics.cpc, Some(0.0));
        assert_eq!(result.metrics.ctr, Some(0.0));
        assert_eq!(result.metrics.roas, Some(0.0));
        assert_eq!(result.metrics.cpa, Some(0.0));
        assert_eq!(result.metrics.roi, Some(0.0));
    }

    #[test]
    fn zero_denominators_never_divide() {
        // Non-zero numerators, zero denominators: revenue with no cost,
        // clicks with no impressions are impossible upstream but must still
        // be guarded here.
        let data = [MetricsInput {
            clicks: 0,
            impressions: 0,
            cost: 0,
            conversions: 0,
            revenue: 500,
        }];
        let result = compute_metrics(&data, &all_metrics());
        assert_eq!(result.metrics.roas, Some(0.0));
        assert_eq!(result.metrics.roi, Some(0.0));
        assert_eq!(result.metrics.cpc, Some(0.0));
    }

    #[test]
    fn computes_requested_ratios_only() {
        let data = [MetricsInput {
            clicks: 100,
            impressions: 2_000,
            cost: 50_000,
            conversions: 10,
            revenue: 150_000,
        }];
        let result = compute_metrics(&data, &["ctr".to_string(), "roi".to_string()]);
        assert_eq!(result.metrics.ctr, Some(5.0));
        assert_eq!(result.metrics.roi, Some(200.0));
        assert_eq!(result.metrics.cpc, None);
        assert_eq!(result.metrics.roas, None);
        assert_eq!(result.metrics.cpa, None);
    }

    #[test]
    fn sums_across_records() {
        let data = [
            MetricsInput {
                clicks: 10,
                impressions: 100,
                cost: 1_000,
                conversions: 1,
                revenue: 3_000,
            },
            MetricsInput {
                clicks: 30,
                impressions: 300,
                cost: 3_000,
                conversions: 3,
                revenue: 9_000,
            },
        ];
        let result = compute_metrics(&data, &["cpc".to_string(), "roas".to_string()]);
        assert_eq!(result.totals.clicks, 40);
        assert_eq!(result.totals.cost, 4_000);
        assert_eq!(result.metrics.cpc, Some(100.0));
        assert_eq!(result.metrics.roas, Some(3.0));
    }

    #[test]
    fn unknown_metric_names_are_ignored() {
        let result = compute_metrics(&[], &["cpc".to_string(), "cpm".to_string()]);
        assert_eq!(result.metrics.cpc, Some(0.0));
        assert_eq!(result.metrics.roi, None);
    }

    #[test]
    fn parses_request_with_defaults() {
        let result =
            calculate_metrics(r#"{"data": [{"clicks": 5, "cost": 500}]}"#).expect("valid request");
        // Default metric set is cpc/roas/cpa.
        assert_eq!(result.metrics.cpc, Some(100.0));
        assert!(result.metrics.roas.is_some());
        assert!(result.metrics.cpa.is_some());
        assert_eq!(result.metrics.ctr, None);
    }

    #[test]
    fn tolerates_extra_fields_in_records() {
        let raw = r#"{"data": [{"date": "2025-11-01", "clicks": 5, "cost": 500, "cpc": 100.0}], "metrics": ["cpc"]}"#;
        let result = calculate_metrics(raw).expect("extra fields are ignored");
        assert_eq!(result.metrics.cpc, Some(100.0));
    }

    #[test]
    fn invalid_json_is_an_explicit_error() {
        let result = calculate_metrics("not json at all");
        assert!(matches!(result, Err(MetricsError::InvalidJson(_))));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Invalid JSON input".to_string()
        );
    }

    #[test]
    fn rounding_helpers() {
        assert_eq!(round0(123.6), 124.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(safe_ratio(1.0, 0.0), 0.0);
    }
}
