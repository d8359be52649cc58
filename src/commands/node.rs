//! Daemon lifecycle and status commands.

use serde_json::{json, Value};

use crate::daemon::{DaemonKind, Supervisor};
use crate::error::Result;

/// Bridge protocol version reported by `health`.
pub const PROTOCOL_VERSION: u8 = 1;

/// `health`: shell process details plus per-daemon state.
pub fn health(supervisor: &Supervisor) -> Value {
    json!({
        "pid": std::process::id(),
        "started_at": supervisor.started_at().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "protocol_v": PROTOCOL_VERSION,
        "node": supervisor.snapshot(DaemonKind::Node),
        "wallet": supervisor.snapshot(DaemonKind::Wallet),
    })
}

/// `start-node` / `start-wallet-rpc`.
pub async fn start(supervisor: &Supervisor, kind: DaemonKind) -> Result<Value> {
    let outcome = supervisor.start(kind)?;
    Ok(serde_json::to_value(outcome).unwrap_or_else(|_| json!({})))
}

/// `stop-node` / `stop-wallet-rpc`.
pub fn stop(supervisor: &Supervisor, kind: DaemonKind) -> Value {
    let outcome = supervisor.stop(kind);
    serde_json::to_value(outcome).unwrap_or_else(|_| json!({}))
}

pub async fn node_status(supervisor: &Supervisor) -> Value {
    let status = supervisor.node_status().await;
    serde_json::to_value(status).unwrap_or_else(|_| json!({ "running": false }))
}

pub async fn wallet_status(supervisor: &Supervisor) -> Value {
    let status = supervisor.wallet_status().await;
    serde_json::to_value(status).unwrap_or_else(|_| json!({ "running": false }))
}
