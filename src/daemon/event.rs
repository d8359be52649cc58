//! Events pushed from the supervisor to the UI.

use serde_json::{json, Value};

use super::DaemonKind;

/// Closed set of notifications the supervisor publishes. None of them expects
/// an acknowledgement.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    /// One stdout line, verbatim.
    Log { kind: DaemonKind, line: String },
    /// One stderr line, verbatim.
    Error { kind: DaemonKind, line: String },
    /// Readiness marker seen; sent once per process.
    Ready { kind: DaemonKind },
    /// Process exited or was stopped. Clean exit and crash look the same.
    Stopped { kind: DaemonKind, code: Option<i32> },
    /// walletd answered `getAddresses` after becoming ready.
    WalletInfo { address: String, has_wallet: bool },
    /// Message box request from a command; the UI renders it.
    Dialog { options: Value },
}

impl ShellEvent {
    /// Wire name of the event (`node-log`, `wallet-info`, ...).
    pub fn name(&self) -> String {
        match self {
            ShellEvent::Log { kind, .. } => format!("{}-log", kind.event_prefix()),
            ShellEvent::Error { kind, .. } => format!("{}-error", kind.event_prefix()),
            ShellEvent::Ready { kind } => format!("{}-ready", kind.event_prefix()),
            ShellEvent::Stopped { kind, .. } => format!("{}-stopped", kind.event_prefix()),
            ShellEvent::WalletInfo { .. } => "wallet-info".to_string(),
            ShellEvent::Dialog { .. } => "dialog".to_string(),
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            ShellEvent::Log { line, .. } | ShellEvent::Error { line, .. } => json!(line),
            ShellEvent::Ready { .. } => Value::Null,
            ShellEvent::Stopped { code, .. } => json!({ "code": code }),
            ShellEvent::WalletInfo {
                address,
                has_wallet,
            } => json!({ "address": address, "hasWallet": has_wallet }),
            ShellEvent::Dialog { options } => options.clone(),
        }
    }

    /// The daemon this event concerns, if any.
    pub fn kind(&self) -> Option<DaemonKind> {
        match self {
            ShellEvent::Log { kind, .. }
            | ShellEvent::Error { kind, .. }
            | ShellEvent::Ready { kind }
            | ShellEvent::Stopped { kind, .. } => Some(*kind),
            ShellEvent::WalletInfo { .. } => Some(DaemonKind::Wallet),
            ShellEvent::Dialog { .. } => None,
        }
    }
}
