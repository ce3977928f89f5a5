//! Analyzer configuration from environment variables

use crate::signals::{
    CircuitBreakingSignalSource, ExponentialBackoff, HttpSignalStore, JsonlSignalStore,
    RetryingSignalSource, SignalSource, SignalSourceError, SqliteSignalStore,
};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_LAYERS: [&str; 4] = ["observatory", "cost-ops", "governance", "consensus"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalBackend {
    Jsonl,
    Sqlite,
    Http,
}

impl SignalBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalBackend::Jsonl => "jsonl",
            SignalBackend::Sqlite => "sqlite",
            SignalBackend::Http => "http",
        }
    }
}

impl FromStr for SignalBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "jsonl" => Ok(SignalBackend::Jsonl),
            "sqlite" => Ok(SignalBackend::Sqlite),
            "http" => Ok(SignalBackend::Http),
            other => Err(ConfigError::InvalidValue(format!(
                "SIGNAL_BACKEND must be one of jsonl, sqlite, http (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Failed to build signal source: {0}")]
    Source(#[from] SignalSourceError),
}

/// Configuration for the analyzer runtime
///
/// Loaded from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Which signal store to read from
    pub backend: SignalBackend,

    pub jsonl_path: PathBuf,
    pub db_path: PathBuf,
    pub store_url: String,
    pub store_api_key: Option<String>,
    pub store_timeout: Duration,

    /// Collaborator-side retry policy for signal fetches
    pub fetch_max_retries: u32,
    pub fetch_initial_delay: Duration,
    pub fetch_max_delay: Duration,

    /// Circuit breaker around the retrying source
    pub breaker_failure_threshold: u32,
    pub breaker_success_threshold: u32,
    pub breaker_open_timeout: Duration,

    /// Request defaults applied when the caller does not override them
    pub source_layers: Vec<String>,
    pub min_confidence: f64,
    pub max_recommendations: usize,
    pub lookback_secs: i64,

    /// Watch mode cadence
    pub emission_interval_secs: u64,

    /// JSONL report file; stdout only when unset
    pub report_path: Option<PathBuf>,
}

impl AnalyzerConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `SIGNAL_BACKEND` (default: jsonl)
    /// - `SIGNAL_JSONL_PATH` (default: data/signals.jsonl)
    /// - `SIGNAL_DB_PATH` (default: data/signals.db)
    /// - `SIGNAL_STORE_URL` (default: http://localhost:8080)
    /// - `SIGNAL_STORE_API_KEY` (optional)
    /// - `SIGNAL_STORE_TIMEOUT_SECS` (default: 30)
    /// - `SIGNAL_FETCH_MAX_RETRIES` (default: 3)
    /// - `SIGNAL_FETCH_INITIAL_DELAY_MS` (default: 200)
    /// - `SIGNAL_FETCH_MAX_DELAY_MS` (default: 5000)
    /// - `SIGNAL_BREAKER_FAILURE_THRESHOLD` (default: 5)
    /// - `SIGNAL_BREAKER_SUCCESS_THRESHOLD` (default: 3)
    /// - `SIGNAL_BREAKER_OPEN_TIMEOUT_SECS` (default: 60)
    /// - `SOURCE_LAYERS` (default: observatory,cost-ops,governance,consensus)
    /// - `MIN_CONFIDENCE` (default: 0.5)
    /// - `MAX_RECOMMENDATIONS` (default: 10)
    /// - `ANALYSIS_LOOKBACK_SECS` (default: 3600)
    /// - `EMISSION_INTERVAL_SECS` (default: 300)
    /// - `REPORT_OUTPUT_PATH` (optional)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key → value lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse::<u64>().ok());

        let backend = match lookup("SIGNAL_BACKEND") {
            Some(value) => value.parse()?,
            None => SignalBackend::Jsonl,
        };

        let source_layers = lookup("SOURCE_LAYERS")
            .map(|s| parse_layers(&s))
            .unwrap_or_else(|| DEFAULT_LAYERS.iter().map(|l| l.to_string()).collect());

        Ok(Self {
            backend,
            jsonl_path: lookup("SIGNAL_JSONL_PATH")
                .unwrap_or_else(|| "data/signals.jsonl".to_string())
                .into(),
            db_path: lookup("SIGNAL_DB_PATH")
                .unwrap_or_else(|| "data/signals.db".to_string())
                .into(),
            store_url: lookup("SIGNAL_STORE_URL")
                .unwrap_or_else(|| "http://localhost:8080".to_string()),
            store_api_key: lookup("SIGNAL_STORE_API_KEY").filter(|k| !k.is_empty()),
            store_timeout: Duration::from_secs(parsed("SIGNAL_STORE_TIMEOUT_SECS").unwrap_or(30)),

            fetch_max_retries: lookup("SIGNAL_FETCH_MAX_RETRIES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(3),
            fetch_initial_delay: Duration::from_millis(
                parsed("SIGNAL_FETCH_INITIAL_DELAY_MS").unwrap_or(200),
            ),
            fetch_max_delay: Duration::from_millis(parsed("SIGNAL_FETCH_MAX_DELAY_MS").unwrap_or(5_000)),

            breaker_failure_threshold: lookup("SIGNAL_BREAKER_FAILURE_THRESHOLD")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(5),
            breaker_success_threshold: lookup("SIGNAL_BREAKER_SUCCESS_THRESHOLD")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(3),
            breaker_open_timeout: Duration::from_secs(
                parsed("SIGNAL_BREAKER_OPEN_TIMEOUT_SECS").unwrap_or(60),
            ),

            source_layers,
            min_confidence: lookup("MIN_CONFIDENCE")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0.5),
            max_recommendations: lookup("MAX_RECOMMENDATIONS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(10),
            lookback_secs: lookup("ANALYSIS_LOOKBACK_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(3_600),

            emission_interval_secs: parsed("EMISSION_INTERVAL_SECS").unwrap_or(300),

            report_path: lookup("REPORT_OUTPUT_PATH")
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.fetch_initial_delay, self.fetch_max_delay, self.fetch_max_retries)
    }

    /// Build the configured signal source
    ///
    /// The store is wrapped as breaker(retry(store)): one exhausted retry
    /// sequence counts as a single breaker failure.
    pub fn build_source(&self) -> Result<Arc<dyn SignalSource>, ConfigError> {
        let source = match self.backend {
            SignalBackend::Jsonl => self.with_resilience(JsonlSignalStore::new(self.jsonl_path.clone())),
            SignalBackend::Sqlite => self.with_resilience(SqliteSignalStore::new(self.db_path.clone())),
            SignalBackend::Http => self.with_resilience(HttpSignalStore::new(
                &self.store_url,
                self.store_api_key.clone(),
                self.store_timeout,
            )?),
        };

        Ok(source)
    }

    fn with_resilience<S: SignalSource + 'static>(&self, store: S) -> Arc<dyn SignalSource> {
        Arc::new(CircuitBreakingSignalSource::new(
            RetryingSignalSource::new(store, self.backoff()),
            self.breaker_failure_threshold,
            self.breaker_success_threshold,
            self.breaker_open_timeout,
        ))
    }
}

/// Split a comma-separated layer list, dropping blanks
pub fn parse_layers(s: &str) -> Vec<String> {
    s.split(',')
        .map(|layer| layer.trim().to_string())
        .filter(|layer| !layer.is_empty())
        .collect()
}
