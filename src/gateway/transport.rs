//! Transport seam under the gateway.
//!
//! The gateway's retry policy keys off [`TransportError`] kinds, never off
//! error message contents, so the trait impl must classify failures
//! explicitly: only `TimedOut` is retryable.

use std::time::Duration;

use serde_json::Value;

#[derive(thiserror::Error, Debug, Clone)]
pub enum TransportError {
    /// The per-attempt deadline fired before a response arrived.
    #[error("timed out: {0}")]
    TimedOut(String),

    /// The connection could not be established (DNS, refused, unreachable).
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub status_text: String,
    pub body: Value,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP attempt. Implementations must honor `deadline` per call and
/// always send session cookies.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: &TransportRequest,
        deadline: Duration,
    ) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by a blocking reqwest client with a shared
/// cookie store.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<HttpTransport> {
        let client = reqwest::blocking::Client::builder()
            .cookie_store(true)
            .build()?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        request: &TransportRequest,
        deadline: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        let builder = match &request.body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = builder
            .timeout(deadline)
            .send()
            .map_err(classify_error)?;

        let status = response.status();
        let status_text = status.canonical_reason().unwrap_or("").to_string();

        // Body read shares the attempt's deadline, so a stalled body counts
        // as a timeout too.
        let text = response.text().map_err(classify_error)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);

        Ok(TransportResponse {
            status: status.as_u16(),
            status_text,
            body,
        })
    }
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::TimedOut(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}
