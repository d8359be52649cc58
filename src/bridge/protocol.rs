//! Bridge protocol types for NDJSON communication over a UNIX socket.
//!
//! Clients send [`Request`] lines. The server answers each with a
//! [`Response`] line and, in between, pushes [`EventFrame`] lines for every
//! supervisor event.
//!
//! CHANGELOG:
//! - 10/14/2026 - Event frames and the ServerFrame union for clients
//! - 10/12/2026 - Initial implementation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::daemon::ShellEvent;

/// Current protocol version.
pub const PROTOCOL_VERSION: u8 = 1;

/// NDJSON request from a UI client.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    /// Unique request ID (UUID)
    pub id: String,
    /// Protocol version (currently 1)
    pub v: u8,
    /// Method name (e.g., "health", "get-balance", "start-node")
    pub method: String,
    /// Method parameters
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// NDJSON response to one request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    /// Request ID (matches request)
    pub id: String,
    /// Success flag
    pub ok: bool,
    /// Result data (if successful)
    pub result: Option<serde_json::Value>,
    /// Error information (if failed)
    pub error: Option<ErrorInfo>,
    pub meta: ResponseMeta,
}

/// Error details in response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Error code (e.g., "UNKNOWN_METHOD", "BAD_REQUEST")
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

/// Response metadata.
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Server execution time in milliseconds
    pub server_ms: f64,
    pub protocol_v: u8,
}

/// Pushed notification: `{"event": "node-log", "data": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Anything a client may read from the socket.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ServerFrame {
    Response(Response),
    Event(EventFrame),
}

impl Request {
    pub fn new(id: impl Into<String>, method: impl Into<String>, params: HashMap<String, serde_json::Value>) -> Self {
        Self {
            id: id.into(),
            v: PROTOCOL_VERSION,
            method: method.into(),
            params,
        }
    }

    /// Parse request from NDJSON line.
    pub fn from_ndjson_line(line: &str) -> Result<Self> {
        serde_json::from_str(line).context("Failed to parse request JSON")
    }

    /// Params as a JSON object for the command surface.
    pub fn params_value(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }

    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

impl Response {
    /// Create a success response.
    pub fn success(id: String, result: serde_json::Value, server_ms: f64) -> Self {
        Self {
            id,
            ok: true,
            result: Some(result),
            error: None,
            meta: ResponseMeta {
                server_ms,
                protocol_v: PROTOCOL_VERSION,
            },
        }
    }

    /// Create an error response.
    pub fn error(id: String, code: &str, message: String, server_ms: f64) -> Self {
        Self {
            id,
            ok: false,
            result: None,
            error: Some(ErrorInfo {
                code: code.to_string(),
                message,
                details: None,
            }),
            meta: ResponseMeta {
                server_ms,
                protocol_v: PROTOCOL_VERSION,
            },
        }
    }

    /// Serialize response to NDJSON line.
    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

impl EventFrame {
    pub fn to_ndjson_line(&self) -> Result<String> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}\n", json))
    }
}

impl From<&ShellEvent> for EventFrame {
    fn from(event: &ShellEvent) -> Self {
        Self {
            event: event.name(),
            data: event.payload(),
        }
    }
}
