//! Request envelope parsing and shape validation
//!
//! The pipeline trusts its input. Everything that can be malformed in a
//! caller-supplied request is rejected here, before `analyze` runs.

use crate::analysis::types::{StrategicRecommendationInput, TimeWindow};
use crate::config::AnalyzerConfig;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RequestError {
    #[error("executionRef must be a UUID (got '{0}')")]
    InvalidExecutionRef(String),

    #[error("time window start {start} is after end {end}")]
    InvertedWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("maxRecommendations must be greater than 0")]
    ZeroMaxRecommendations,

    #[error("minConfidence must be within [0, 1] (got {0})")]
    InvalidMinConfidence(f64),

    #[error("start and end must be given together")]
    PartialWindow,

    #[error("lookback must be non-negative (got {0}s)")]
    NegativeLookback(i64),

    #[error("lookback of {0}s reaches outside the representable time range")]
    LookbackOutOfRange(i64),
}

/// Partially specified request, as it arrives from the CLI or a JSON body
///
/// Missing fields are filled from `AnalyzerConfig` defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub lookback_secs: Option<i64>,
    pub source_layers: Option<Vec<String>>,
    pub min_confidence: Option<f64>,
    pub max_recommendations: Option<usize>,
    pub execution_ref: Option<String>,
}

impl AnalysisRequest {
    /// Resolve against config defaults and validate
    ///
    /// An explicit start/end pair wins over a lookback. Without either, the
    /// window trails `now` by the configured lookback.
    pub fn into_input(
        self,
        config: &AnalyzerConfig,
        now: DateTime<Utc>,
    ) -> Result<StrategicRecommendationInput, RequestError> {
        let time_window = match (self.start, self.end) {
            (Some(start), Some(end)) => TimeWindow::new(start, end),
            (None, None) => {
                let lookback = self.lookback_secs.unwrap_or(config.lookback_secs);
                if lookback < 0 {
                    return Err(RequestError::NegativeLookback(lookback));
                }
                TimeWindow::trailing(now, lookback)
                    .ok_or(RequestError::LookbackOutOfRange(lookback))?
            }
            _ => return Err(RequestError::PartialWindow),
        };

        let input = StrategicRecommendationInput {
            time_window,
            source_layers: self
                .source_layers
                .unwrap_or_else(|| config.source_layers.clone()),
            min_confidence: self.min_confidence.unwrap_or(config.min_confidence),
            max_recommendations: self
                .max_recommendations
                .unwrap_or(config.max_recommendations),
            execution_ref: self
                .execution_ref
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
        };

        validate_input(&input)?;
        Ok(input)
    }
}

pub fn validate_input(input: &StrategicRecommendationInput) -> Result<(), RequestError> {
    if Uuid::parse_str(&input.execution_ref).is_err() {
        return Err(RequestError::InvalidExecutionRef(input.execution_ref.clone()));
    }

    if input.time_window.start > input.time_window.end {
        return Err(RequestError::InvertedWindow {
            start: input.time_window.start,
            end: input.time_window.end,
        });
    }

    if input.max_recommendations == 0 {
        return Err(RequestError::ZeroMaxRecommendations);
    }

    if !input.min_confidence.is_finite() || !(0.0..=1.0).contains(&input.min_confidence) {
        return Err(RequestError::InvalidMinConfidence(input.min_confidence));
    }

    Ok(())
}
