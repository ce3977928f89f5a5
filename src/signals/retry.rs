//! Retry wrapper for signal sources
//!
//! Retries belong to the collaborator, never to the pipeline. The wrapper
//! retries transient failures with exponential backoff and hands permanent
//! failures back immediately.

use super::{SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_retries: u32,
    current_attempt: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("Maximum retry attempts exceeded")]
pub struct MaxRetriesExceeded;

impl ExponentialBackoff {
    pub fn new(initial_delay: Duration, max_delay: Duration, max_retries: u32) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_retries,
            current_attempt: 0,
        }
    }

    /// Delay before the next attempt: `initial * 2^attempt`, capped
    pub fn next_delay(&self) -> Duration {
        let factor = 2u32.saturating_pow(self.current_attempt);
        std::cmp::min(self.initial_delay.saturating_mul(factor), self.max_delay)
    }

    pub async fn sleep(&mut self) -> Result<(), MaxRetriesExceeded> {
        if self.current_attempt >= self.max_retries {
            return Err(MaxRetriesExceeded);
        }

        let delay = self.next_delay();

        log::warn!(
            "⏳ Retry attempt {} of {} in {:?}",
            self.current_attempt + 1,
            self.max_retries,
            delay
        );

        sleep(delay).await;
        self.current_attempt += 1;
        Ok(())
    }

    pub fn attempts(&self) -> u32 {
        self.current_attempt
    }

    pub fn reset(&mut self) {
        self.current_attempt = 0;
    }
}

pub struct RetryingSignalSource<S> {
    inner: S,
    backoff: ExponentialBackoff,
}

impl<S: SignalSource> RetryingSignalSource<S> {
    pub fn new(inner: S, backoff: ExponentialBackoff) -> Self {
        Self { inner, backoff }
    }
}

#[async_trait]
impl<S: SignalSource> SignalSource for RetryingSignalSource<S> {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        // Attempt state is per call
        let mut backoff = self.backoff.clone();
        backoff.reset();

        loop {
            match self.inner.fetch_signals(window, layers).await {
                Ok(signals) => {
                    if backoff.attempts() > 0 {
                        log::info!(
                            "✅ {} fetch succeeded after {} retries",
                            self.inner.source_type(),
                            backoff.attempts()
                        );
                    }
                    return Ok(signals);
                }
                Err(e) if e.is_transient() => {
                    log::warn!("⚠️  {} fetch failed: {}", self.inner.source_type(), e);
                    if backoff.sleep().await.is_err() {
                        log::error!(
                            "❌ {} fetch giving up after {} retries",
                            self.inner.source_type(),
                            backoff.attempts()
                        );
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn source_type(&self) -> &'static str {
        self.inner.source_type()
    }
}
