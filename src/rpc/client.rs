//! HTTP transport for daemon JSON-RPC calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::protocol::{RpcRequest, RpcResponse};
use super::RpcError;

/// JSON-RPC client for the local daemons.
///
/// Cheap to clone; clones share the connection pool and the request counter.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    host: String,
    request_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Create a client targeting `host` (e.g. `127.0.0.1`).
    pub fn new(host: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| RpcError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            host: host.into(),
            request_id: Arc::new(AtomicU64::new(1)),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn endpoint(&self, port: u16) -> String {
        format!("http://{}:{}/json_rpc", self.host, port)
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call `method` on the daemon listening on `port`.
    ///
    /// Returns the `result` member, or the whole body when the daemon omits it.
    pub async fn call(&self, port: u16, method: &str, params: Value) -> Result<Value, RpcError> {
        let result = self.call_inner(port, method, params).await;
        if let Err(ref e) = result {
            warn!(port, method, "RPC error: {}", e);
        }
        result
    }

    /// Call with an empty params object.
    pub async fn call_no_params(&self, port: u16, method: &str) -> Result<Value, RpcError> {
        self.call(port, method, Value::Object(serde_json::Map::new()))
            .await
    }

    async fn call_inner(&self, port: u16, method: &str, params: Value) -> Result<Value, RpcError> {
        let params = if params.is_null() {
            Value::Object(serde_json::Map::new())
        } else {
            params
        };
        let request = RpcRequest::new(method, params, self.next_id());
        debug!(port, method, id = request.id, "RPC request");

        let response = self
            .http
            .post(self.endpoint(port))
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        let mut envelope: RpcResponse = serde_json::from_value(body.clone())
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        if let Some(err) = envelope.daemon_error() {
            return Err(err);
        }

        Ok(envelope.take_result().unwrap_or(body))
    }
}
