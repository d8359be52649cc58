//! Error types shared by the supervisor and the command surface.
//!
//! CHANGELOG:
//! - 10/14/2026 - Added ConfirmationRequired for secret export
//! - 10/12/2026 - Initial taxonomy

use std::path::PathBuf;

use thiserror::Error;

use crate::amount::AmountError;
use crate::daemon::DaemonKind;
use crate::rpc::RpcError;

/// Everything that can go wrong between a UI request and a daemon.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Wallet already exists. Use restore or delete existing wallet.")]
    WalletExists,

    #[error("No wallet found at {0:?}")]
    WalletMissing(PathBuf),

    #[error("{tool} CLI not found. Please install {tool} to generate proofs.")]
    ToolMissing { tool: String },

    #[error("{tool} failed: {message}")]
    ToolFailed { tool: String, message: String },

    #[error("{0}")]
    Unsupported(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error("Exporting secret material requires \"confirm\": true")]
    ConfirmationRequired,

    #[error("Failed to start {kind}: {source}")]
    Spawn {
        kind: DaemonKind,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} did not become ready in time")]
    ReadyTimeout(DaemonKind),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShellError>;

impl ShellError {
    /// Stable code used by the bridge when an error escapes a request.
    pub fn code(&self) -> &'static str {
        match self {
            ShellError::Rpc(_) => "RPC_ERROR",
            ShellError::WalletExists => "WALLET_EXISTS",
            ShellError::WalletMissing(_) => "WALLET_MISSING",
            ShellError::ToolMissing { .. } => "TOOL_MISSING",
            ShellError::ToolFailed { .. } => "TOOL_FAILED",
            ShellError::Unsupported(_) => "UNSUPPORTED",
            ShellError::InvalidParams(_) | ShellError::Amount(_) => "INVALID_PARAMS",
            ShellError::ConfirmationRequired => "CONFIRMATION_REQUIRED",
            ShellError::Spawn { .. } => "SPAWN_FAILED",
            ShellError::ReadyTimeout(_) => "READY_TIMEOUT",
            ShellError::UnknownMethod(_) => "UNKNOWN_METHOD",
            ShellError::Io(_) => "IO_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_missing_message() {
        let err = ShellError::ToolMissing {
            tool: "xfg-stark".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "xfg-stark CLI not found. Please install xfg-stark to generate proofs."
        );
        assert_eq!(err.code(), "TOOL_MISSING");
    }

    #[test]
    fn test_rpc_error_is_transparent() {
        let err: ShellError = RpcError::Daemon {
            code: -32601,
            message: "Method not found".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Method not found");
        assert_eq!(err.code(), "RPC_ERROR");
    }
}
