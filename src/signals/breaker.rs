//! Circuit breaker wrapper for signal sources
//!
//! ```text
//!            failures ≥ threshold
//!   Closed ───────────────────────→ Open
//!     ↑                              │ open_timeout elapsed
//!     │ successes ≥ threshold        ↓
//!     └──────────────────────── HalfOpen ──failure──→ Open
//! ```
//!
//! While open, fetches fail fast with `SignalSourceError::Unavailable`
//! without touching the inner source. Only transient errors count as
//! failures; a permanent error (bad request, decode) says nothing about the
//! store's health.

use super::{SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    opened_at: Option<Instant>,
}

pub struct CircuitBreakingSignalSource<S> {
    inner: S,
    failure_threshold: u32,
    success_threshold: u32,
    open_timeout: Duration,
    state: Mutex<BreakerState>,
}

impl<S: SignalSource> CircuitBreakingSignalSource<S> {
    /// Thresholds below 1 are raised to 1
    pub fn new(inner: S, failure_threshold: u32, success_threshold: u32, open_timeout: Duration) -> Self {
        Self {
            inner,
            failure_threshold: failure_threshold.max(1),
            success_threshold: success_threshold.max(1),
            open_timeout,
            state: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                half_open_successes: 0,
                opened_at: None,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.state.lock().await.state
    }

    /// Whether a call may go through; moves Open → HalfOpen once the timeout has elapsed
    async fn try_acquire(&self) -> bool {
        let mut guard = self.state.lock().await;

        match guard.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let expired = guard
                    .opened_at
                    .map_or(true, |opened| opened.elapsed() >= self.open_timeout);
                if expired {
                    guard.state = CircuitState::HalfOpen;
                    log::info!(
                        "🔌 {} circuit {}, letting a trial call through",
                        self.inner.source_type(),
                        guard.state.as_str()
                    );
                    guard.half_open_successes = 0;
                }
                expired
            }
        }
    }

    async fn record_success(&self) {
        let mut guard = self.state.lock().await;

        match guard.state {
            CircuitState::Closed => guard.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                guard.half_open_successes += 1;
                if guard.half_open_successes >= self.success_threshold {
                    log::info!("✅ {} circuit closed after recovery", self.inner.source_type());
                    guard.state = CircuitState::Closed;
                    guard.consecutive_failures = 0;
                    guard.half_open_successes = 0;
                    guard.opened_at = None;
                }
            }
            CircuitState::Open => {}
        }
    }

    async fn record_failure(&self) {
        let mut guard = self.state.lock().await;

        match guard.state {
            CircuitState::Closed => {
                guard.consecutive_failures += 1;
                if guard.consecutive_failures >= self.failure_threshold {
                    log::warn!(
                        "⚠️  {} circuit open after {} consecutive failures",
                        self.inner.source_type(),
                        guard.consecutive_failures
                    );
                    guard.state = CircuitState::Open;
                    guard.opened_at = Some(Instant::now());
                }
            }
            CircuitState::HalfOpen => {
                log::warn!("⚠️  {} circuit reopened, trial call failed", self.inner.source_type());
                guard.state = CircuitState::Open;
                guard.half_open_successes = 0;
                guard.opened_at = Some(Instant::now());
            }
            CircuitState::Open => {}
        }
    }
}

#[async_trait]
impl<S: SignalSource> SignalSource for CircuitBreakingSignalSource<S> {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        if !self.try_acquire().await {
            return Err(SignalSourceError::Unavailable(format!(
                "{} circuit is open",
                self.inner.source_type()
            )));
        }

        let result = self.inner.fetch_signals(window, layers).await;
        match &result {
            Ok(_) => self.record_success().await,
            Err(e) if e.is_transient() => self.record_failure().await,
            Err(_) => {}
        }
        result
    }

    fn source_type(&self) -> &'static str {
        self.inner.source_type()
    }
}
