//! Strategic analyzer - sequences the pipeline for one request
//!
//! ## Architecture
//!
//! ```text
//! StrategicRecommendationInput
//!     ↓
//! SignalSource::fetch_signals()        (only I/O, only await point)
//!     ↓
//! SignalAggregator::aggregate()
//!     ↓
//! TrendAnalyzer::analyze_trends()
//!     ↓
//! CorrelationDetector::detect_correlations()
//!     ↓
//! RecommendationSynthesizer::synthesize()
//!     ↓
//! StrategicRecommendationOutput
//! ```
//!
//! The analyzer owns no per-run state. Concurrent `analyze` calls share only
//! the injected source and the immutable stage configuration.

use super::aggregator::SignalAggregator;
use super::correlator::CorrelationDetector;
use super::synthesizer::RecommendationSynthesizer;
use super::trend::TrendAnalyzer;
use super::types::{
    AnalysisMetadata, StrategicRecommendation, StrategicRecommendationInput,
    StrategicRecommendationOutput,
};
use crate::error::AnalysisError;
use crate::signals::SignalSource;
use std::sync::Arc;
use std::time::Instant;

pub struct StrategicAnalyzer {
    source: Arc<dyn SignalSource>,
    aggregator: SignalAggregator,
    trend_analyzer: TrendAnalyzer,
    correlation_detector: CorrelationDetector,
    synthesizer: RecommendationSynthesizer,
}

impl StrategicAnalyzer {
    /// Create an analyzer over the given signal source with the built-in
    /// recommendation patterns
    pub fn new(source: Arc<dyn SignalSource>) -> Self {
        Self::with_synthesizer(source, RecommendationSynthesizer::new())
    }

    /// Create an analyzer with a custom synthesizer (e.g. extra patterns)
    pub fn with_synthesizer(source: Arc<dyn SignalSource>, synthesizer: RecommendationSynthesizer) -> Self {
        Self {
            source,
            aggregator: SignalAggregator::new(),
            trend_analyzer: TrendAnalyzer::new(),
            correlation_detector: CorrelationDetector::new(),
            synthesizer,
        }
    }

    pub fn source_type(&self) -> &'static str {
        self.source.source_type()
    }

    /// Run the full pipeline for one request
    ///
    /// # Returns
    /// * `Ok(output)` - ranked recommendations plus run statistics; empty
    ///   inputs give an empty list and `overall_confidence == 0`
    /// * `Err(AnalysisError::SignalFetch)` - the signal source failed; the
    ///   failure is passed through without retry
    pub async fn analyze(
        &self,
        input: &StrategicRecommendationInput,
    ) -> Result<StrategicRecommendationOutput, AnalysisError> {
        let started = Instant::now();

        let signals = self
            .source
            .fetch_signals(&input.time_window, &input.source_layers)
            .await
            .map_err(|source| AnalysisError::SignalFetch {
                source_type: self.source.source_type(),
                source,
            })?;

        let aggregation = self.aggregator.aggregate(signals, input.time_window);
        let trends = self.trend_analyzer.analyze_trends(&aggregation);
        let correlations = self.correlation_detector.detect_correlations(&trends);
        let recommendations = self.synthesizer.synthesize(&trends, &correlations, input);

        let overall_confidence = overall_confidence(&recommendations);
        let processing_duration = started.elapsed();

        log::info!(
            "📊 Analysis {}: {} signals, {} trends, {} correlations → {} recommendations (confidence {:.3}, {:?})",
            input.execution_ref,
            aggregation.total_signals,
            trends.len(),
            correlations.len(),
            recommendations.len(),
            overall_confidence,
            processing_duration
        );

        Ok(StrategicRecommendationOutput {
            total_signals_analyzed: aggregation.total_signals,
            trends_identified: trends.len(),
            correlations_found: correlations.len(),
            overall_confidence,
            analysis_metadata: AnalysisMetadata {
                time_window: input.time_window,
                layers_analyzed: aggregation.layers_included,
                processing_duration,
            },
            recommendations,
        })
    }
}

/// Mean recommendation confidence, 0 for an empty list
pub fn overall_confidence(recommendations: &[StrategicRecommendation]) -> f64 {
    if recommendations.is_empty() {
        return 0.0;
    }

    recommendations.iter().map(|r| r.confidence).sum::<f64>() / recommendations.len() as f64
}
