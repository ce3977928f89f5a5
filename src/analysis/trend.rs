//! Per-metric trend classification
//!
//! Every (layer, metric_type) group with at least two signals gets one
//! `TrendAnalysis`. Values are taken in arrival order; no time sort happens.
//!
//! # Classification (first match wins)
//! 1. `std_dev / mean > 0.3` → volatile
//! 2. `|slope| < mean * 0.05` → stable
//! 3. otherwise increasing if `slope > 0`, else decreasing
//!
//! A zero mean cannot be normalized, so such groups are reported as stable
//! with zero magnitude.

use super::types::{Signal, SignalAggregation, TrendAnalysis, TrendDirection};
use std::collections::BTreeMap;

/// Coefficient of variation above which a series counts as volatile
pub const VOLATILITY_THRESHOLD: f64 = 0.3;

/// Slope below this fraction of the mean counts as flat
pub const STABILITY_THRESHOLD: f64 = 0.05;

/// Sample size at which the confidence discount saturates
pub const FULL_CONFIDENCE_SAMPLES: f64 = 100.0;

const MIN_DATA_POINTS: usize = 2;

pub struct TrendAnalyzer;

impl TrendAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Compute one trend per qualifying (layer, metric_type) group
    ///
    /// Output is ordered by layer, then metric type (both lexical).
    pub fn analyze_trends(&self, aggregation: &SignalAggregation) -> Vec<TrendAnalysis> {
        let mut trends = Vec::new();

        for (layer, signals) in &aggregation.signals_by_layer {
            let mut by_metric: BTreeMap<&str, Vec<&Signal>> = BTreeMap::new();
            for signal in signals {
                by_metric
                    .entry(signal.metric_type.as_str())
                    .or_default()
                    .push(signal);
            }

            for (metric_type, group) in by_metric {
                if group.len() < MIN_DATA_POINTS {
                    log::debug!(
                        "Skipping {}/{}: only {} data point(s)",
                        layer,
                        metric_type,
                        group.len()
                    );
                    continue;
                }

                trends.push(self.compute_trend(layer, metric_type, &group));
            }
        }

        log::debug!("Identified {} trends", trends.len());
        trends
    }

    fn compute_trend(&self, layer: &str, metric_type: &str, group: &[&Signal]) -> TrendAnalysis {
        let n = group.len();
        let values: Vec<f64> = group.iter().map(|s| s.value).collect();

        let slope = (values[n - 1] - values[0]) / (n - 1) as f64;
        let mean = values.iter().sum::<f64>() / n as f64;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n as f64;
        let std_dev = variance.sqrt();

        let (direction, magnitude) = if mean == 0.0 {
            (TrendDirection::Stable, 0.0)
        } else {
            (
                classify(slope, mean, std_dev),
                (slope / mean).abs().min(1.0),
            )
        };

        let avg_confidence = group.iter().map(|s| s.confidence).sum::<f64>() / n as f64;
        let sample_factor = (n as f64 / FULL_CONFIDENCE_SAMPLES).min(1.0);

        TrendAnalysis {
            metric_type: metric_type.to_string(),
            layer: layer.to_string(),
            direction,
            magnitude,
            velocity: slope,
            data_points: n,
            confidence: avg_confidence * sample_factor,
        }
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn classify(slope: f64, mean: f64, std_dev: f64) -> TrendDirection {
    if std_dev / mean > VOLATILITY_THRESHOLD {
        TrendDirection::Volatile
    } else if slope.abs() < mean * STABILITY_THRESHOLD {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Increasing
    } else {
        TrendDirection::Decreasing
    }
}
