//! JSON-RPC 2.0 client for the node and wallet daemons.
//!
//! Both daemons expose `POST /json_rpc` on a local port. Each call is a single
//! request/response; nothing is retried here.

mod client;
mod protocol;

pub use client::RpcClient;
pub use protocol::{RpcErrorObject, RpcRequest, RpcResponse};

use thiserror::Error;

/// Errors returned by [`RpcClient::call`].
#[derive(Error, Debug)]
pub enum RpcError {
    /// Daemon unreachable, connection reset, timeout.
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// The daemon answered but rejected the call.
    #[error("{message}")]
    Daemon { code: i64, message: String },
}

impl RpcError {
    /// True when the daemon could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}
