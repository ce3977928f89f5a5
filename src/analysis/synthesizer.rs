//! Recommendation synthesis and ranking
//!
//! # Steps
//! 1. Each non-weak correlation is checked against the pattern table; the
//!    first match yields one candidate
//! 2. Candidate confidence is the mean of the two trend confidences
//! 3. Candidates below `min_confidence` are dropped
//! 4. Sort by priority rank (critical first), then confidence descending
//! 5. Keep the first `max_recommendations`

use super::patterns::{default_patterns, RecommendationPattern};
use super::types::{
    CorrelationStrength, CrossDomainCorrelation, StrategicRecommendation,
    StrategicRecommendationInput, TrendAnalysis,
};
use uuid::Uuid;

pub struct RecommendationSynthesizer {
    patterns: Vec<RecommendationPattern>,
}

impl RecommendationSynthesizer {
    pub fn new() -> Self {
        Self::with_patterns(default_patterns())
    }

    pub fn with_patterns(patterns: Vec<RecommendationPattern>) -> Self {
        Self { patterns }
    }

    /// Derive, filter, rank and cap recommendations
    ///
    /// `trends` is accepted for parity with the stage contract; everything a
    /// candidate needs is carried on the correlation itself.
    pub fn synthesize(
        &self,
        trends: &[TrendAnalysis],
        correlations: &[CrossDomainCorrelation],
        input: &StrategicRecommendationInput,
    ) -> Vec<StrategicRecommendation> {
        let mut candidates: Vec<StrategicRecommendation> = correlations
            .iter()
            .filter(|c| c.strength != CorrelationStrength::Weak)
            .filter_map(|c| self.derive_candidate(c))
            .collect();

        let derived = candidates.len();
        candidates.retain(|r| r.confidence >= input.min_confidence);

        candidates.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| b.confidence.total_cmp(&a.confidence))
        });
        candidates.truncate(input.max_recommendations);

        log::debug!(
            "Synthesized {} recommendations ({} candidates from {} correlations over {} trends)",
            candidates.len(),
            derived,
            correlations.len(),
            trends.len()
        );
        candidates
    }

    fn derive_candidate(&self, correlation: &CrossDomainCorrelation) -> Option<StrategicRecommendation> {
        let (pattern, (first, second)) = self
            .patterns
            .iter()
            .find_map(|p| p.matches(correlation).map(|pair| (p, pair)))?;

        let confidence =
            (correlation.primary_trend.confidence + correlation.secondary_trend.confidence) / 2.0;

        let rationale = format!(
            "{} correlation (coefficient {:.2}, causality {}) between {} in {} and {} in {} [{}]",
            correlation.strength.as_str(),
            correlation.correlation_coefficient,
            correlation.causality.as_str(),
            first.metric_type,
            first.layer,
            second.metric_type,
            second.layer,
            pattern.name
        );

        Some(StrategicRecommendation {
            recommendation_id: Uuid::new_v4().to_string(),
            category: pattern.category,
            priority: (pattern.priority)(correlation),
            title: pattern.title.to_string(),
            description: (pattern.describe)(first, second),
            rationale,
            supporting_correlations: vec![correlation.correlation_id.clone()],
            supporting_trends: vec![first.metric_type.clone(), second.metric_type.clone()],
            confidence,
            time_horizon: pattern.time_horizon,
        })
    }
}

impl Default for RecommendationSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::patterns::strong_is_high;
    use crate::analysis::types::{
        Causality, Priority, RecommendationCategory, TimeHorizon, TimeWindow, TrendDirection,
    };
    use chrono::{TimeZone, Utc};

    fn create_test_trend(layer: &str, metric_type: &str, confidence: f64) -> TrendAnalysis {
        TrendAnalysis {
            metric_type: metric_type.to_string(),
            layer: layer.to_string(),
            direction: TrendDirection::Increasing,
            magnitude: 0.3,
            velocity: 10.0,
            data_points: 50,
            confidence,
        }
    }

    fn create_correlation(
        id: &str,
        primary: TrendAnalysis,
        secondary: TrendAnalysis,
        strength: CorrelationStrength,
    ) -> CrossDomainCorrelation {
        CrossDomainCorrelation {
            correlation_id: id.to_string(),
            primary_trend: primary,
            secondary_trend: secondary,
            correlation_coefficient: if strength == CorrelationStrength::Strong { 0.75 } else { 0.6 },
            strength,
            causality: Causality::Potential,
        }
    }

    fn create_input(min_confidence: f64, max_recommendations: usize) -> StrategicRecommendationInput {
        StrategicRecommendationInput {
            time_window: TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 5, 1, 1, 0, 0).unwrap(),
            ),
            source_layers: vec!["observatory".to_string(), "cost-ops".to_string()],
            min_confidence,
            max_recommendations,
            execution_ref: "8c9a4a2e-4d0c-4b53-9a53-0c6f3f2f7e11".to_string(),
        }
    }

    fn latency_cost(id: &str, latency_conf: f64, cost_conf: f64, strength: CorrelationStrength) -> CrossDomainCorrelation {
        create_correlation(
            id,
            create_test_trend("observatory", "latency", latency_conf),
            create_test_trend("cost-ops", "cost", cost_conf),
            strength,
        )
    }

    #[test]
    fn test_latency_cost_candidate() {
        let correlations = vec![latency_cost("corr-0-1", 0.8, 0.6, CorrelationStrength::Strong)];

        let recs = RecommendationSynthesizer::new().synthesize(&[], &correlations, &create_input(0.5, 10));

        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.category, RecommendationCategory::CostOptimization);
        assert_eq!(rec.priority, Priority::High);
        assert_eq!(rec.time_horizon, TimeHorizon::ShortTerm);
        assert!((rec.confidence - 0.7).abs() < 1e-9);
        assert_eq!(rec.supporting_correlations, vec!["corr-0-1"]);
        assert_eq!(rec.supporting_trends, vec!["latency", "cost"]);
        assert!(Uuid::parse_str(&rec.recommendation_id).is_ok());
    }

    #[test]
    fn test_moderate_is_medium_priority() {
        let correlations = vec![latency_cost("corr-0-1", 0.8, 0.8, CorrelationStrength::Moderate)];

        let recs = RecommendationSynthesizer::new().synthesize(&[], &correlations, &create_input(0.0, 10));

        assert_eq!(recs[0].priority, Priority::Medium);
    }

    #[test]
    fn test_weak_and_unmatched_correlations_yield_nothing() {
        let correlations = vec![
            latency_cost("corr-0-1", 0.9, 0.9, CorrelationStrength::Weak),
            create_correlation(
                "corr-0-2",
                create_test_trend("observatory", "throughput", 0.9),
                create_test_trend("governance", "violations", 0.9),
                CorrelationStrength::Strong,
            ),
        ];

        let recs = RecommendationSynthesizer::new().synthesize(&[], &correlations, &create_input(0.0, 10));

        assert!(recs.is_empty());
    }

    #[test]
    fn test_min_confidence_filter() {
        let correlations = vec![
            latency_cost("corr-0-1", 0.9, 0.9, CorrelationStrength::Strong),
            latency_cost("corr-0-2", 0.2, 0.2, CorrelationStrength::Strong),
        ];

        let recs = RecommendationSynthesizer::new().synthesize(&[], &correlations, &create_input(0.5, 10));

        assert_eq!(recs.len(), 1);
        assert!(recs.iter().all(|r| r.confidence >= 0.5));
    }

    #[test]
    fn test_ranking_and_cap() {
        let correlations = vec![
            latency_cost("corr-a", 0.6, 0.6, CorrelationStrength::Moderate),
            latency_cost("corr-b", 0.7, 0.7, CorrelationStrength::Strong),
            latency_cost("corr-c", 0.9, 0.9, CorrelationStrength::Moderate),
            latency_cost("corr-d", 0.95, 0.95, CorrelationStrength::Strong),
        ];

        let synthesizer = RecommendationSynthesizer::new();
        let all = synthesizer.synthesize(&[], &correlations, &create_input(0.0, 10));
        let order: Vec<&str> = all.iter().map(|r| r.supporting_correlations[0].as_str()).collect();
        assert_eq!(order, vec!["corr-d", "corr-b", "corr-c", "corr-a"]);

        for pair in all.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(
                a.priority.rank() < b.priority.rank()
                    || (a.priority == b.priority && a.confidence >= b.confidence)
            );
        }

        let capped = synthesizer.synthesize(&[], &correlations, &create_input(0.0, 2));
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].supporting_correlations, vec!["corr-d"]);
    }

    #[test]
    fn test_ties_keep_derivation_order() {
        let correlations = vec![
            latency_cost("corr-x", 0.7, 0.7, CorrelationStrength::Strong),
            latency_cost("corr-y", 0.7, 0.7, CorrelationStrength::Strong),
            latency_cost("corr-z", 0.7, 0.7, CorrelationStrength::Strong),
        ];

        let recs = RecommendationSynthesizer::new().synthesize(&[], &correlations, &create_input(0.0, 10));

        let order: Vec<&str> = recs.iter().map(|r| r.supporting_correlations[0].as_str()).collect();
        assert_eq!(order, vec!["corr-x", "corr-y", "corr-z"]);
    }

    #[test]
    fn test_custom_pattern_extends_table() {
        let mut patterns = default_patterns();
        patterns.push(RecommendationPattern {
            name: "violations-throughput",
            first_metric: "violations",
            second_metric: "throughput",
            category: RecommendationCategory::GovernanceCompliance,
            title: "Tighten policy enforcement under load",
            time_horizon: TimeHorizon::Immediate,
            priority: |_| Priority::Critical,
            describe: |a, b| format!("{} tracks {}", a.metric_type, b.metric_type),
        });
        let correlations = vec![
            latency_cost("corr-0-1", 0.9, 0.9, CorrelationStrength::Strong),
            create_correlation(
                "corr-0-2",
                create_test_trend("observatory", "throughput", 0.6),
                create_test_trend("governance", "violations", 0.6),
                CorrelationStrength::Moderate,
            ),
        ];

        let recs = RecommendationSynthesizer::with_patterns(patterns).synthesize(&[], &correlations, &create_input(0.0, 10));

        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].category, RecommendationCategory::GovernanceCompliance);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(recs[0].supporting_trends, vec!["violations", "throughput"]);
        assert_eq!(recs[1].priority, strong_is_high(&correlations[0]));
    }
}
