//! Strategist - cross-layer strategic recommendation engine
//!
//! Reads monitoring signals from several layers (observatory, cost-ops,
//! governance, consensus), detects per-layer trends and cross-layer
//! correlations, and turns them into ranked strategic recommendations.

pub mod analysis;
pub mod config;
pub mod error;
pub mod report;
pub mod request;
pub mod signals;

pub use analysis::{
    StrategicAnalyzer, StrategicRecommendation, StrategicRecommendationInput,
    StrategicRecommendationOutput,
};
pub use config::AnalyzerConfig;
pub use error::AnalysisError;
pub use signals::{SignalSource, SignalSourceError};
