//! Cross-layer correlation detection between trends
//!
//! The coefficient is a similarity heuristic, not a Pearson correlation:
//! `direction_score * magnitude_alignment * 0.8`, which keeps it inside
//! roughly [-0.8, 0.8].

use super::types::{Causality, CorrelationStrength, CrossDomainCorrelation, TrendAnalysis};

/// Pairs at or below this absolute coefficient are discarded
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.5;

const SAME_DIRECTION_SCORE: f64 = 1.0;
const OPPOSITE_DIRECTION_SCORE: f64 = -0.5;
const COEFFICIENT_SCALE: f64 = 0.8;

pub struct CorrelationDetector;

impl CorrelationDetector {
    pub fn new() -> Self {
        Self
    }

    /// Examine every pair `(i, j)` with `i < j` from different layers
    ///
    /// Correlation ids are `corr-{i}-{j}`, unique within one call.
    pub fn detect_correlations(&self, trends: &[TrendAnalysis]) -> Vec<CrossDomainCorrelation> {
        let mut correlations = Vec::new();

        for i in 0..trends.len() {
            for j in (i + 1)..trends.len() {
                let (primary, secondary) = (&trends[i], &trends[j]);
                if primary.layer == secondary.layer {
                    continue;
                }

                let coefficient = self.compute_coefficient(primary, secondary);
                if coefficient.abs() <= SIGNIFICANCE_THRESHOLD {
                    continue;
                }

                correlations.push(CrossDomainCorrelation {
                    correlation_id: format!("corr-{}-{}", i, j),
                    primary_trend: primary.clone(),
                    secondary_trend: secondary.clone(),
                    correlation_coefficient: coefficient,
                    strength: classify_strength(coefficient),
                    causality: classify_causality(coefficient),
                });
            }
        }

        log::debug!(
            "Found {} significant correlations among {} trends",
            correlations.len(),
            trends.len()
        );
        correlations
    }

    pub fn compute_coefficient(&self, a: &TrendAnalysis, b: &TrendAnalysis) -> f64 {
        let direction_score = if a.direction == b.direction {
            SAME_DIRECTION_SCORE
        } else {
            OPPOSITE_DIRECTION_SCORE
        };
        let magnitude_alignment = 1.0 - (a.magnitude - b.magnitude).abs();

        direction_score * magnitude_alignment * COEFFICIENT_SCALE
    }
}

impl Default for CorrelationDetector {
    fn default() -> Self {
        Self::new()
    }
}

// The weak branch cannot be reached for retained pairs (|c| > 0.5), but the
// three-way split is kept so the thresholds stay in one place.
fn classify_strength(coefficient: f64) -> CorrelationStrength {
    let abs = coefficient.abs();
    if abs >= 0.7 {
        CorrelationStrength::Strong
    } else if abs >= 0.4 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Weak
    }
}

fn classify_causality(coefficient: f64) -> Causality {
    let abs = coefficient.abs();
    if abs < 0.5 {
        Causality::None
    } else if abs < 0.8 {
        Causality::Potential
    } else {
        Causality::Likely
    }
}
