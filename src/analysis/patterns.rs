//! Correlation → recommendation rules
//!
//! Each `RecommendationPattern` pairs a predicate over the two correlated
//! trends with a recommendation template. The synthesizer walks the table in
//! order and the first matching pattern wins, so new mappings are added by
//! appending to the table rather than touching the ranking logic.

use super::types::{
    CorrelationStrength, CrossDomainCorrelation, Priority, RecommendationCategory, TimeHorizon,
    TrendAnalysis,
};

pub struct RecommendationPattern {
    pub name: &'static str,
    /// Substring the first trend's metric type must contain
    pub first_metric: &'static str,
    /// Substring the other trend's metric type must contain
    pub second_metric: &'static str,
    pub category: RecommendationCategory,
    pub title: &'static str,
    pub time_horizon: TimeHorizon,
    pub priority: fn(&CrossDomainCorrelation) -> Priority,
    pub describe: fn(first: &TrendAnalysis, second: &TrendAnalysis) -> String,
}

impl RecommendationPattern {
    /// Match against a correlation in either trend order
    ///
    /// Returns the trends reordered so the one matching `first_metric`
    /// comes first.
    pub fn matches<'a>(
        &self,
        correlation: &'a CrossDomainCorrelation,
    ) -> Option<(&'a TrendAnalysis, &'a TrendAnalysis)> {
        let (a, b) = (&correlation.primary_trend, &correlation.secondary_trend);

        if a.metric_type.contains(self.first_metric) && b.metric_type.contains(self.second_metric) {
            Some((a, b))
        } else if b.metric_type.contains(self.first_metric)
            && a.metric_type.contains(self.second_metric)
        {
            Some((b, a))
        } else {
            None
        }
    }
}

/// Built-in rule table
pub fn default_patterns() -> Vec<RecommendationPattern> {
    vec![RecommendationPattern {
        name: "latency-cost",
        first_metric: "latency",
        second_metric: "cost",
        category: RecommendationCategory::CostOptimization,
        title: "Optimize cost-performance trade-off",
        time_horizon: TimeHorizon::ShortTerm,
        priority: strong_is_high,
        describe: describe_latency_cost,
    }]
}

/// `High` for strong correlations, `Medium` otherwise
pub fn strong_is_high(correlation: &CrossDomainCorrelation) -> Priority {
    if correlation.strength == CorrelationStrength::Strong {
        Priority::High
    } else {
        Priority::Medium
    }
}

fn describe_latency_cost(latency: &TrendAnalysis, cost: &TrendAnalysis) -> String {
    format!(
        "Latency in {} is {} while cost in {} is {}. Review model routing, caching and \
         provisioning so spend tracks the performance actually delivered.",
        latency.layer,
        latency.direction.as_str(),
        cost.layer,
        cost.direction.as_str()
    )
}
