//! Analysis Core - Signal → Recommendation Pipeline
//!
//! Turns raw monitoring signals from several layers into ranked strategic
//! recommendations.
//!
//! # Architecture
//!
//! ```text
//! SignalSource (JSONL / SQLite / HTTP / memory)
//!     ↓
//! SignalAggregator (group by layer)
//!     ↓
//! TrendAnalyzer (slope, mean, std-dev → direction/magnitude/confidence)
//!     ↓
//! CorrelationDetector (cross-layer pairs, |coefficient| > 0.5)
//!     ↓
//! RecommendationSynthesizer (pattern table, min-confidence filter, rank, cap)
//!     ↓
//! StrategicAnalyzer → StrategicRecommendationOutput
//! ```
//!
//! Every stage after the fetch is a pure function over in-memory data.

pub mod aggregator;
pub mod correlator;
pub mod orchestrator;
pub mod patterns;
pub mod synthesizer;
pub mod trend;
pub mod types;

pub use aggregator::SignalAggregator;
pub use correlator::CorrelationDetector;
pub use orchestrator::StrategicAnalyzer;
pub use patterns::{default_patterns, RecommendationPattern};
pub use synthesizer::RecommendationSynthesizer;
pub use trend::TrendAnalyzer;
pub use types::{
    AnalysisMetadata, Causality, CorrelationStrength, CrossDomainCorrelation, Priority,
    RecommendationCategory, Signal, SignalAggregation, StrategicRecommendation,
    StrategicRecommendationInput, StrategicRecommendationOutput, TimeHorizon, TimeWindow,
    TrendAnalysis, TrendDirection,
};
