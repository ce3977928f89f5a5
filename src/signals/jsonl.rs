//! JSONL file signal store
//!
//! One camelCase `Signal` per line. Blank lines are ignored and malformed
//! lines are logged and skipped so one bad record does not sink a run.

use super::{matches_selection, SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct JsonlSignalStore {
    path: PathBuf,
}

impl JsonlSignalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SignalSource for JsonlSignalStore {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        let file = File::open(&self.path).await?;
        let mut lines = BufReader::new(file).lines();

        let mut signals = Vec::new();
        let mut skipped = 0usize;
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Signal::from_jsonl(line) {
                Ok(signal) => {
                    if matches_selection(&signal, window, layers) {
                        signals.push(signal);
                    }
                }
                Err(e) => {
                    skipped += 1;
                    log::warn!("Skipping malformed signal at {}:{}: {}", self.path.display(), line_no, e);
                }
            }
        }

        log::debug!(
            "📥 Read {} signals from {} ({} malformed lines skipped)",
            signals.len(),
            self.path.display(),
            skipped
        );
        Ok(signals)
    }

    fn source_type(&self) -> &'static str {
        "jsonl"
    }
}
