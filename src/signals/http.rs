//! HTTP signal store client
//!
//! ## API
//!
//! `GET {endpoint}/api/v1/signals?start={rfc3339}&end={rfc3339}&layers={a,b}`
//! returns a JSON array of camelCase signals. The optional API key is sent
//! as a bearer token. Results are filtered again locally, so a store that
//! ignores the query parameters still yields the right selection.

use super::{matches_selection, SignalSource, SignalSourceError};
use crate::analysis::types::{Signal, TimeWindow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use std::time::Duration;

pub struct HttpSignalStore {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSignalStore {
    pub fn new(endpoint: &str, api_key: Option<String>, timeout: Duration) -> Result<Self, SignalSourceError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn signals_url(&self) -> String {
        format!("{}/api/v1/signals", self.endpoint)
    }

    fn query_params(window: &TimeWindow, layers: &[String]) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("start", window.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ("end", window.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ];
        if !layers.is_empty() {
            params.push(("layers", layers.join(",")));
        }
        params
    }
}

#[async_trait]
impl SignalSource for HttpSignalStore {
    async fn fetch_signals(
        &self,
        window: &TimeWindow,
        layers: &[String],
    ) -> Result<Vec<Signal>, SignalSourceError> {
        let mut request = self
            .client
            .get(self.signals_url())
            .query(&Self::query_params(window, layers));
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SignalSourceError::Status { status, body });
        }

        let signals: Vec<Signal> = response.json().await?;
        let total = signals.len();
        let selected: Vec<Signal> = signals
            .into_iter()
            .filter(|s| matches_selection(s, window, layers))
            .collect();

        log::debug!(
            "📥 Fetched {} signals from {} ({} outside selection)",
            selected.len(),
            self.endpoint,
            total - selected.len()
        );
        Ok(selected)
    }

    fn source_type(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_signals_url_trims_trailing_slash() {
        let store = HttpSignalStore::new("http://signals.internal:8080/", None, Duration::from_secs(5)).unwrap();

        assert_eq!(store.signals_url(), "http://signals.internal:8080/api/v1/signals");
    }

    #[test]
    fn test_query_params() {
        let params = HttpSignalStore::query_params(
            &test_window(),
            &["observatory".to_string(), "cost-ops".to_string()],
        );

        assert_eq!(params[0], ("start", "2024-05-01T12:00:00.000Z".to_string()));
        assert_eq!(params[1], ("end", "2024-05-01T13:00:00.000Z".to_string()));
        assert_eq!(params[2], ("layers", "observatory,cost-ops".to_string()));

        let no_layers = HttpSignalStore::query_params(&test_window(), &[]);
        assert_eq!(no_layers.len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_store_is_transient() {
        // Port 9 on localhost (discard) is closed on test machines
        let store = HttpSignalStore::new("http://127.0.0.1:9", None, Duration::from_secs(2)).unwrap();

        let err = store.fetch_signals(&test_window(), &[]).await.unwrap_err();

        assert!(matches!(err, SignalSourceError::Http(_)));
        assert!(err.is_transient());
    }
}
