//! Groups raw signals by source layer

use super::types::{Signal, SignalAggregation, TimeWindow};
use std::collections::BTreeMap;

pub struct SignalAggregator;

impl SignalAggregator {
    pub fn new() -> Self {
        Self
    }

    /// Group signals by `layer`, keeping every signal exactly once
    ///
    /// The window is carried through as metadata only; filtering by time is
    /// the signal source's job. Arrival order is preserved within a layer.
    pub fn aggregate(&self, signals: Vec<Signal>, time_window: TimeWindow) -> SignalAggregation {
        let total_signals = signals.len();
        let mut signals_by_layer: BTreeMap<String, Vec<Signal>> = BTreeMap::new();

        for signal in signals {
            signals_by_layer
                .entry(signal.layer.clone())
                .or_default()
                .push(signal);
        }

        let layers_included: Vec<String> = signals_by_layer.keys().cloned().collect();

        log::debug!(
            "Aggregated {} signals across {} layers",
            total_signals,
            layers_included.len()
        );

        SignalAggregation {
            time_window,
            signals_by_layer,
            total_signals,
            layers_included,
        }
    }
}

impl Default for SignalAggregator {
    fn default() -> Self {
        Self::new()
    }
}
