//! In-memory signal store for tests, demos and replay

use super::{matches_selection, SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct InMemorySignalStore {
    signals: Vec<Signal>,
}

impl InMemorySignalStore {
    pub fn new(signals: Vec<Signal>) -> Self {
        Self { signals }
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[async_trait]
impl SignalSource for InMemorySignalStore {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        Ok(self
            .signals
            .iter()
            .filter(|s| matches_selection(s, window, layers))
            .cloned()
            .collect())
    }

    fn source_type(&self) -> &'static str {
        "memory"
    }
}
