//! Synchronous HTTP client for the price-prediction backend.
//!
//! One `ureq` agent per client, with the configured timeout applied to every
//! call so a stalled backend cannot block a view forever. Each call is
//! recorded in the request log (endpoint, outcome, status, latency) when
//! logging is enabled; request and response bodies are never logged.
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    HealthStatus, MarketStats, MetadataResponse, PredictionRequest, PredictionResponse, Validate,
};
use super::{ApiError, Endpoint, PriceApi};
use crate::config::HomevalConfig;
use crate::telemetry::logger::RequestLog;

/// Synchronous client bound to one backend base URL.
#[derive(Debug)]
pub struct ApiClient {
    base_url: String,
    timeout: Duration,
    agent: ureq::Agent,
    log: RequestLog,
}

impl ApiClient {
    /// Build a client with request logging disabled.
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            timeout,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            log: RequestLog::disabled(),
        }
    }

    /// Build a client from the resolved config, including its request log.
    pub fn from_config(config: &HomevalConfig) -> Self {
        Self::new(
            &config.api.base_url,
            Duration::from_millis(config.api.timeout_ms),
        )
        .with_request_log(RequestLog::from_config(&config.logging))
    }

    /// Replace the request log.
    pub fn with_request_log(mut self, log: RequestLog) -> Self {
        self.log = log;
        self
    }

    /// The normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Perform one call and record it in the request log.
    fn call<T, B>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate,
        B: Serialize,
    {
        let start = Instant::now();
        let (status, result) = self.send(endpoint, body);
        let latency_ms = start.elapsed().as_millis() as u64;

        let outcome = match &result {
            Ok(_) => "ok",
            Err(err) => err.kind(),
        };
        self.log.record(endpoint.name(), outcome, status, latency_ms);

        result
    }

    fn send<T, B>(&self, endpoint: Endpoint, body: Option<&B>) -> (Option<u16>, Result<T, ApiError>)
    where
        T: DeserializeOwned + Validate,
        B: Serialize,
    {
        let url = self.url(endpoint);
        let response = match body {
            Some(body) => self.agent.post(&url).send_json(body),
            None => self.agent.get(&url).call(),
        };

        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(status, resp)) => {
                return (Some(status), Err(status_error(endpoint, status, resp)));
            }
            Err(ureq::Error::Transport(transport)) => {
                return (
                    None,
                    Err(ApiError::Transport {
                        endpoint,
                        message: transport.to_string(),
                    }),
                );
            }
        };

        let status = response.status();
        let text = match response.into_string() {
            Ok(text) => text,
            Err(e) => {
                return (
                    Some(status),
                    Err(ApiError::Transport {
                        endpoint,
                        message: format!("failed reading response body: {e}"),
                    }),
                );
            }
        };

        (Some(status), decode(endpoint, &text))
    }
}

impl PriceApi for ApiClient {
    fn fetch_metadata(&self) -> Result<MetadataResponse, ApiError> {
        self.call::<MetadataResponse, ()>(Endpoint::Metadata, None)
    }

    fn predict(&self, request: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        self.call(Endpoint::Predict, Some(request))
    }

    fn fetch_market_stats(&self) -> Result<MarketStats, ApiError> {
        self.call::<MarketStats, ()>(Endpoint::MarketStats, None)
    }

    fn fetch_health(&self) -> Result<HealthStatus, ApiError> {
        self.call::<HealthStatus, ()>(Endpoint::Health, None)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Strip trailing slashes and pin `localhost` to IPv4 so a backend bound
/// only to `127.0.0.1` does not wait out an IPv6 attempt first.
fn normalize_base_url(base_url: &str) -> String {
    base_url
        .trim()
        .trim_end_matches('/')
        .replace("://localhost", "://127.0.0.1")
}

/// Parse and validate a success body.
pub(crate) fn decode<T>(endpoint: Endpoint, body: &str) -> Result<T, ApiError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_str(body).map_err(|e| ApiError::Malformed {
        endpoint,
        reason: e.to_string(),
    })?;
    value
        .validate()
        .map_err(|reason| ApiError::Malformed { endpoint, reason })?;
    Ok(value)
}

/// Build the error for a non-success status.
///
/// Only predict failures look at the body, where the backend puts a
/// `{"detail": "..."}` message meant for the user.
fn status_error(endpoint: Endpoint, status: u16, response: ureq::Response) -> ApiError {
    let message = match endpoint {
        Endpoint::Predict => response
            .into_string()
            .ok()
            .and_then(|body| detail_message(&body))
            .unwrap_or_else(|| endpoint.failure_message().to_string()),
        _ => endpoint.failure_message().to_string(),
    };
    ApiError::Status {
        endpoint,
        status,
        message,
    }
}

/// Extract a string `detail` field from an error body.
///
/// FastAPI validation errors carry `detail` as an array of objects; those
/// fall back to the generic message.
fn detail_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")?
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8000/", Duration::from_secs(1));
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(
            client.url(Endpoint::MarketStats),
            "http://127.0.0.1:8000/api/v1/analytics/market-stats"
        );
    }

    #[test]
    fn client_from_default_config() {
        let config = HomevalConfig::default();
        let client = ApiClient::from_config(&config);
        assert_eq!(client.base_url(), "http://127.0.0.1:8000");
        assert_eq!(client.timeout(), Duration::from_millis(10_000));
    }

    #[test]
    fn detail_message_extracts_string() {
        assert_eq!(
            detail_message(r#"{"detail": "bad input"}"#).as_deref(),
            Some("bad input")
        );
    }

    #[test]
    fn detail_message_rejects_non_string_or_missing() {
        assert_eq!(detail_message(r#"{"detail": [{"msg": "x"}]}"#), None);
        assert_eq!(detail_message(r#"{"error": "x"}"#), None);
        assert_eq!(detail_message(r#"{"detail": "  "}"#), None);
        assert_eq!(detail_message("<html>502</html>"), None);
        assert_eq!(detail_message(""), None);
    }

    #[test]
    fn decode_reports_parse_failures_as_malformed() {
        let err = decode::<MetadataResponse>(Endpoint::Metadata, "{}").unwrap_err();
        assert!(matches!(err, ApiError::Malformed { endpoint: Endpoint::Metadata, .. }));
    }

    #[test]
    fn decode_reports_validation_failures_as_malformed() {
        let body = r#"{"locations": [], "bhk_options": [], "algorithm": "gbr"}"#;
        let err = decode::<MetadataResponse>(Endpoint::Metadata, body).unwrap_err();
        match err {
            ApiError::Malformed { reason, .. } => assert!(reason.contains("locations")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreachable_backend_is_transport_error() {
        // Port 9 (discard) is closed on test machines; the connect fails fast.
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500));
        let err = client.fetch_metadata().unwrap_err();
        assert_eq!(err.kind(), "transport");
    }
}
