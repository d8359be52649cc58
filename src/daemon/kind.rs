//! The two supervised daemon kinds and what distinguishes them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ShellConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DaemonKind {
    /// `fuegod`, the blockchain node.
    Node,
    /// `walletd`, the wallet RPC service.
    Wallet,
}

impl DaemonKind {
    pub const ALL: [DaemonKind; 2] = [DaemonKind::Node, DaemonKind::Wallet];

    /// Executable name under the binaries root.
    pub fn binary_name(self) -> &'static str {
        match self {
            DaemonKind::Node => "fuegod",
            DaemonKind::Wallet => "walletd",
        }
    }

    /// Event name prefix (`node-log`, `wallet-ready`, ...).
    pub fn event_prefix(self) -> &'static str {
        match self {
            DaemonKind::Node => "node",
            DaemonKind::Wallet => "wallet",
        }
    }

    /// Startup phrases that mark the daemon as ready.
    pub fn readiness_markers(self) -> &'static [&'static str] {
        match self {
            DaemonKind::Node => &["Core initialized OK", "Node started"],
            DaemonKind::Wallet => &["Wallet loading is finished", "walletd started"],
        }
    }

    /// Substring match against the readiness markers.
    pub fn is_ready_line(self, line: &str) -> bool {
        self.readiness_markers().iter().any(|m| line.contains(m))
    }

    /// RPC port the daemon is told to bind.
    pub fn rpc_port(self, config: &ShellConfig) -> u16 {
        match self {
            DaemonKind::Node => config.node_rpc_port,
            DaemonKind::Wallet => config.wallet_rpc_port,
        }
    }
}

impl fmt::Display for DaemonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DaemonKind::Node => write!(f, "Node"),
            DaemonKind::Wallet => write!(f, "Wallet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_markers() {
        assert!(DaemonKind::Node.is_ready_line("2026-10-12 INFO Core initialized OK"));
        assert!(DaemonKind::Node.is_ready_line("Node started, listening"));
        assert!(!DaemonKind::Node.is_ready_line("Wallet loading is finished"));
        assert!(!DaemonKind::Node.is_ready_line("core initialized ok"));
    }

    #[test]
    fn test_wallet_markers() {
        assert!(DaemonKind::Wallet.is_ready_line("Wallet loading is finished."));
        assert!(DaemonKind::Wallet.is_ready_line("[main] walletd started"));
        assert!(!DaemonKind::Wallet.is_ready_line("Core initialized OK"));
    }

    #[test]
    fn test_ports_follow_config() {
        let mut config = ShellConfig::default();
        config.node_rpc_port = 28081;
        assert_eq!(DaemonKind::Node.rpc_port(&config), 28081);
        assert_eq!(DaemonKind::Wallet.rpc_port(&config), 18082);
    }

    #[test]
    fn test_display_and_prefix() {
        assert_eq!(DaemonKind::Node.to_string(), "Node");
        assert_eq!(DaemonKind::Wallet.event_prefix(), "wallet");
        assert_eq!(DaemonKind::Wallet.binary_name(), "walletd");
    }
}
