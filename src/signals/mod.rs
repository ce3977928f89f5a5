//! Signal sources - the single external capability the pipeline consumes
//!
//! ```text
//! JSONL file ─┐
//! SQLite db  ─┼→ SignalSource::fetch_signals(window, layers) → Vec<Signal>
//! HTTP store ─┤
//! in-memory  ─┘
//!
//! Configured stores are wrapped collaborator-side:
//! CircuitBreakingSignalSource(RetryingSignalSource(store))
//! ```
//!
//! Every source returns only signals inside the window (inclusive) and, when
//! `layers` is non-empty, only signals from the listed layers. An empty layer
//! list means all layers.

pub mod breaker;
pub mod http;
pub mod jsonl;
pub mod memory;
pub mod retry;
pub mod sqlite;

pub use breaker::{CircuitBreakingSignalSource, CircuitState};
pub use http::HttpSignalStore;
pub use jsonl::JsonlSignalStore;
pub use memory::InMemorySignalStore;
pub use retry::{ExponentialBackoff, RetryingSignalSource};
pub use sqlite::SqliteSignalStore;

use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum SignalSourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Signal store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Signal store unavailable: {0}")]
    Unavailable(String),
}

impl SignalSourceError {
    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            SignalSourceError::Io(_) => true,
            SignalSourceError::Http(e) => !e.is_decode() && !e.is_builder(),
            SignalSourceError::Status { status, .. } => *status >= 500 || *status == 429,
            SignalSourceError::Unavailable(_) => true,
            SignalSourceError::Serialization(_)
            | SignalSourceError::Database(_)
            | SignalSourceError::Join(_) => false,
        }
    }
}

/// Collaborator that fetches raw signals for an analysis window
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError>;

    /// Source type for logging
    fn source_type(&self) -> &'static str;
}

/// Window and layer filter shared by every source
pub fn matches_selection(signal: &Signal, window: &TimeWindow, layers: &[String]) -> bool {
    window.contains(signal.timestamp) && (layers.is_empty() || layers.iter().any(|l| *l == signal.layer))
}
