//! Access layer for the KnowledgeLink HTTP API.
//!
//! Owns endpoint resolution, the per-attempt deadline, and the bounded retry
//! policy. Only timeout-class transport failures are retried; HTTP error
//! statuses and other transport failures are reported on the first attempt.

mod endpoints;
mod transport;

pub use endpoints::Endpoint;
pub use transport::{
    HttpTransport, Method, Transport, TransportError, TransportRequest, TransportResponse,
};

use std::{sync::Arc, thread::sleep, time::Duration};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::links::{LinksResponse, Reference};
use crate::session::MeResponse;

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Non-2xx response. Never retried.
    #[error("HTTP {status}: {status_text}")]
    Http { status: u16, status_text: String },

    /// Deadline fired on every attempt, retry budget exhausted.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Terminal transport failure (unreachable host etc). Never retried.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered 2xx with a body we could not decode.
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Absolute base URL of the service. `None` or empty means requests use
    /// bare relative paths (same-origin deployment).
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for GatewayConfig {
    fn default() -> GatewayConfig {
        GatewayConfig {
            base_url: None,
            timeout_ms: 60_000,
            max_retries: 2,
            retry_backoff_ms: 2_000,
        }
    }
}

pub struct RequestGateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
}

impl RequestGateway {
    /// Panics on a malformed configuration; a zero timeout is a programmer
    /// error, not a runtime failure.
    pub fn new(config: GatewayConfig, transport: Arc<dyn Transport>) -> RequestGateway {
        assert!(config.timeout_ms > 0, "gateway timeout_ms must be greater than 0");

        let base_url = config
            .base_url
            .as_deref()
            .map(|base| base.strip_suffix('/').unwrap_or(base).to_string());

        RequestGateway {
            config: GatewayConfig { base_url, ..config },
            transport,
        }
    }

    /// Maps a logical endpoint to its request URL. Pure.
    pub fn resolve(&self, endpoint: Endpoint) -> String {
        match self.config.base_url.as_deref() {
            Some(base) if !base.is_empty() => format!("{}{}", base, endpoint.path()),
            _ => endpoint.path().to_string(),
        }
    }

    /// Performs one logical request under the timeout/retry policy. Each
    /// attempt gets a fresh deadline; a timed-out attempt is re-issued
    /// identically after `retry_backoff_ms` until the budget runs out.
    pub fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
    ) -> Result<Value, GatewayError> {
        let request = TransportRequest {
            method,
            url: url.to_string(),
            body,
        };
        let deadline = Duration::from_millis(self.config.timeout_ms);

        let mut budget = self.config.max_retries;
        loop {
            log::debug!("{} {}", request.method, request.url);

            match self.transport.send(&request, deadline) {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => {
                    return Err(GatewayError::Http {
                        status: response.status,
                        status_text: response.status_text,
                    })
                }
                Err(TransportError::TimedOut(msg)) if budget > 0 => {
                    budget -= 1;
                    log::info!(
                        "{} timed out, retrying ({} retries left after this one): {}",
                        request.url,
                        budget,
                        msg
                    );
                    sleep(Duration::from_millis(self.config.retry_backoff_ms));
                }
                Err(TransportError::TimedOut(msg)) => return Err(GatewayError::Timeout(msg)),
                Err(err) => return Err(GatewayError::Network(err.to_string())),
            }
        }
    }

    pub fn create_reference(&self, raw_url: &str) -> Result<Reference, GatewayError> {
        let url = self.resolve(Endpoint::CreateReference);
        let payload = self.execute(Method::Post, &url, Some(json!({ "url": raw_url })))?;
        decode(payload)
    }

    pub fn list_references(&self) -> Result<Vec<Reference>, GatewayError> {
        let url = self.resolve(Endpoint::ListReferences);
        let payload = self.execute(Method::Get, &url, None)?;
        decode::<LinksResponse>(payload).map(|response| response.links)
    }

    pub fn search(&self, query: &str) -> Result<Vec<Reference>, GatewayError> {
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let url = format!("{}?q={}", self.resolve(Endpoint::Search), encoded);
        let payload = self.execute(Method::Get, &url, None)?;
        decode::<LinksResponse>(payload).map(|response| response.links)
    }

    pub fn session(&self) -> Result<MeResponse, GatewayError> {
        let url = self.resolve(Endpoint::AuthSession);
        decode(self.execute(Method::Get, &url, None)?)
    }

    pub fn logout(&self) -> Result<(), GatewayError> {
        let url = self.resolve(Endpoint::AuthLogout);
        self.execute(Method::Post, &url, None).map(|_| ())
    }

    /// Browser navigation target for the OAuth redirect flow. Not a JSON
    /// call; the caller hands this URL to the user agent.
    pub fn login_url(&self) -> String {
        self.resolve(Endpoint::AuthLogin)
    }
}

fn decode<T>(payload: Value) -> Result<T, GatewayError>
where
    T: DeserializeOwned,
{
    serde_json::from_value(payload).map_err(|err| {
        log::error!("failed to decode response: {err}");
        GatewayError::Decode(err.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{ok, ScriptedTransport};
    use serde_json::json;

    fn gateway(
        base_url: Option<&str>,
        script: Vec<Result<TransportResponse, TransportError>>,
    ) -> (Arc<ScriptedTransport>, RequestGateway) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let config = GatewayConfig {
            base_url: base_url.map(str::to_string),
            timeout_ms: 1_000,
            max_retries: 2,
            retry_backoff_ms: 0,
        };
        let gateway = RequestGateway::new(config, transport.clone() as Arc<dyn Transport>);
        (transport, gateway)
    }

    #[test]
    fn resolve_joins_base_url_and_path() {
        let (_, gw) = gateway(Some("http://localhost:8000"), vec![]);
        assert_eq!(gw.resolve(Endpoint::Search), "http://localhost:8000/api/search");
    }

    #[test]
    fn resolve_strips_trailing_slash_from_base() {
        let (_, gw) = gateway(Some("http://localhost:8000/"), vec![]);
        assert_eq!(gw.resolve(Endpoint::CreateReference), "http://localhost:8000/api/links");
    }

    #[test]
    fn resolve_returns_bare_path_without_base() {
        let (_, gw) = gateway(None, vec![]);
        assert_eq!(gw.resolve(Endpoint::AuthSession), "/api/auth/me");

        let (_, gw) = gateway(Some(""), vec![]);
        assert_eq!(gw.resolve(Endpoint::AuthSession), "/api/auth/me");
    }

    #[test]
    fn resolve_is_pure() {
        let (_, gw) = gateway(Some("http://api.test"), vec![]);
        assert_eq!(gw.resolve(Endpoint::AuthLogout), gw.resolve(Endpoint::AuthLogout));
    }

    #[test]
    fn timeout_makes_one_initial_and_two_retry_attempts() {
        let script = vec![
            Err(TransportError::TimedOut("deadline".into())),
            Err(TransportError::TimedOut("deadline".into())),
            Err(TransportError::TimedOut("deadline".into())),
        ];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        let err = gw
            .execute(Method::Get, "http://api.test/api/links", None)
            .unwrap_err();

        assert!(matches!(err, GatewayError::Timeout(_)));
        assert_eq!(transport.request_count(), 3);
    }

    #[test]
    fn timeout_then_success_returns_payload() {
        let script = vec![
            Err(TransportError::TimedOut("deadline".into())),
            ok(200, json!({ "links": [] })),
        ];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        let payload = gw
            .execute(Method::Get, "http://api.test/api/links", None)
            .unwrap();

        assert_eq!(payload, json!({ "links": [] }));
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn http_error_is_not_retried() {
        let script = vec![ok(500, json!({ "detail": "boom" }))];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        let err = gw
            .execute(Method::Post, "http://api.test/api/links", Some(json!({ "url": "x" })))
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn network_error_is_not_retried() {
        let script = vec![Err(TransportError::Connect("refused".into()))];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        let err = gw
            .execute(Method::Get, "http://api.test/api/links", None)
            .unwrap_err();

        assert!(matches!(err, GatewayError::Network(_)));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn retried_attempts_reissue_the_identical_request() {
        let script = vec![
            Err(TransportError::TimedOut("deadline".into())),
            ok(200, json!({ "id": "1", "url": "https://a.io" })),
        ];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        gw.create_reference("https://a.io").unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, requests[1].url);
        assert_eq!(requests[0].body, requests[1].body);
        assert_eq!(requests[0].method, Method::Post);
    }

    #[test]
    fn search_urlencodes_the_query() {
        let script = vec![ok(200, json!({ "links": [] }))];
        let (transport, gw) = gateway(Some("http://api.test"), script);

        gw.search("rust ownership & borrowing").unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url,
            "http://api.test/api/search?q=rust+ownership+%26+borrowing"
        );
    }

    #[test]
    fn malformed_success_body_is_a_decode_error() {
        let script = vec![ok(200, json!({ "links": "not a list" }))];
        let (_, gw) = gateway(Some("http://api.test"), script);

        let err = gw.list_references().unwrap_err();
        assert!(matches!(err, GatewayError::Decode(_)));
    }

    #[test]
    #[should_panic(expected = "timeout_ms")]
    fn zero_timeout_aborts_construction() {
        let transport = Arc::new(ScriptedTransport::new(vec![]));
        let config = GatewayConfig {
            timeout_ms: 0,
            ..GatewayConfig::default()
        };
        RequestGateway::new(config, transport as Arc<dyn Transport>);
    }
}
