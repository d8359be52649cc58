//! JSON-RPC 2.0 envelope types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RpcError;

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    pub params: Value,
}

impl RpcRequest {
    pub fn new(method: impl Into<String>, params: Value, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC 2.0 response.
///
/// `error` is kept as a raw value: walletd and fuegod do not agree on its
/// shape, so the message is extracted leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

/// Structured view of an `error` member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcResponse {
    /// The daemon error carried by this envelope, if any.
    ///
    /// Message comes from `error.message`, falling back to the serialized
    /// error object.
    pub fn daemon_error(&self) -> Option<RpcError> {
        let error = self.error.as_ref().filter(|e| !e.is_null())?;
        let parsed: Option<RpcErrorObject> = serde_json::from_value(error.clone()).ok();

        let code = parsed.as_ref().map(|e| e.code).unwrap_or(0);
        let message = parsed
            .and_then(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| error.to_string());

        Some(RpcError::Daemon { code, message })
    }

    /// The `result` member when present and non-null.
    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take().filter(|r| !r.is_null())
    }
}
