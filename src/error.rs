//! Pipeline error type

use crate::signals::SignalSourceError;

/// Failures surfaced by `StrategicAnalyzer::analyze`
///
/// Uninteresting data (few points, no correlations, low confidence) is never
/// an error; it produces empty results instead.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Signal fetch from {source_type} failed: {source}")]
    SignalFetch {
        source_type: &'static str,
        #[source]
        source: SignalSourceError,
    },
}

impl AnalysisError {
    pub fn is_transient(&self) -> bool {
        match self {
            AnalysisError::SignalFetch { source, .. } => source.is_transient(),
        }
    }
}
