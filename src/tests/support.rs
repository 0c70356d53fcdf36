//! Shared test doubles.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;

use crate::gateway::{Transport, TransportError, TransportRequest, TransportResponse};

/// Builds a scripted success result with the canonical status text.
pub fn ok(status: u16, body: Value) -> Result<TransportResponse, TransportError> {
    let status_text = match status {
        200 => "OK",
        201 => "Created",
        401 => "Unauthorized",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "",
    };

    Ok(TransportResponse {
        status,
        status_text: status_text.to_string(),
        body,
    })
}

/// Transport double that replays a scripted sequence of results and records
/// every request it sees.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(
        &self,
        request: &TransportRequest,
        _deadline: Duration,
    ) -> Result<TransportResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", request.method, request.url))
    }
}
