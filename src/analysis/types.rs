//! Data model shared by every pipeline stage
//!
//! Field names serialize as camelCase and enum values as kebab-case so the
//! envelopes match what REST/CLI callers exchange.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One observation emitted by a monitoring layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signal {
    pub signal_id: String,
    pub layer: String,
    pub timestamp: DateTime<Utc>,
    pub metric_type: String,
    pub value: f64,
    pub confidence: f64,
}

impl Signal {
    /// Parse a Signal from a JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window ending at `end` and reaching `lookback_secs` into the past
    ///
    /// `None` when the lookback does not fit chrono's date range.
    pub fn trailing(end: DateTime<Utc>, lookback_secs: i64) -> Option<Self> {
        let lookback = Duration::try_seconds(lookback_secs)?;
        let start = end.checked_sub_signed(lookback)?;
        Some(Self { start, end })
    }

    /// Inclusive at both ends
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Signals grouped by source layer for one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalAggregation {
    pub time_window: TimeWindow,
    pub signals_by_layer: BTreeMap<String, Vec<Signal>>,
    pub total_signals: usize,
    pub layers_included: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
            TrendDirection::Volatile => "volatile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metric_type: String,
    pub layer: String,
    pub direction: TrendDirection,
    pub magnitude: f64,
    pub velocity: f64,
    pub data_points: usize,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Causality {
    None,
    Potential,
    Likely,
}

impl Causality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Causality::None => "none",
            Causality::Potential => "potential",
            Causality::Likely => "likely",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossDomainCorrelation {
    pub correlation_id: String,
    pub primary_trend: TrendAnalysis,
    pub secondary_trend: TrendAnalysis,
    pub correlation_coefficient: f64,
    pub strength: CorrelationStrength,
    pub causality: Causality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationCategory {
    CostOptimization,
    PerformanceImprovement,
    RiskMitigation,
    CapacityPlanning,
    GovernanceCompliance,
    StrategicInitiative,
}

/// Declaration order is ranking order: `Critical` sorts first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeHorizon {
    Immediate,
    ShortTerm,
    MediumTerm,
    LongTerm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicRecommendation {
    pub recommendation_id: String,
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub rationale: String,
    pub supporting_correlations: Vec<String>,
    pub supporting_trends: Vec<String>,
    pub confidence: f64,
    pub time_horizon: TimeHorizon,
}

/// Request envelope. Shape validation happens in the transport layer
/// (see `crate::request`), never inside the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicRecommendationInput {
    pub time_window: TimeWindow,
    pub source_layers: Vec<String>,
    pub min_confidence: f64,
    pub max_recommendations: usize,
    pub execution_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub time_window: TimeWindow,
    pub layers_analyzed: Vec<String>,
    #[serde(rename = "processingDurationMs", with = "duration_millis")]
    pub processing_duration: std::time::Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicRecommendationOutput {
    pub recommendations: Vec<StrategicRecommendation>,
    pub total_signals_analyzed: usize,
    pub trends_identified: usize,
    pub correlations_found: usize,
    pub overall_confidence: f64,
    pub analysis_metadata: AnalysisMetadata,
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
