//! Command lines for fuegod and walletd.

use std::path::PathBuf;

use super::DaemonKind;
use crate::config::ShellConfig;

/// A fully resolved daemon invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchSpec {
    pub fn for_kind(kind: DaemonKind, config: &ShellConfig) -> Self {
        let args = match kind {
            DaemonKind::Node => node_args(config),
            DaemonKind::Wallet => wallet_args(config),
        };
        Self {
            program: config.binary_path(kind.binary_name()),
            args,
        }
    }
}

fn node_args(config: &ShellConfig) -> Vec<String> {
    vec![
        format!("--data-dir={}", config.data_dir().display()),
        format!("--rpc-bind-port={}", config.node_rpc_port),
        "--restricted-rpc".to_string(),
        "--enable-cors=*".to_string(),
        "--log-level=1".to_string(),
    ]
}

fn wallet_args(config: &ShellConfig) -> Vec<String> {
    vec![
        format!("--container-file={}", config.wallet_file().display()),
        // walletd containers created by the shell are unencrypted
        "--container-password=".to_string(),
        format!("--rpc-bind-port={}", config.wallet_rpc_port),
        format!(
            "--daemon-address={}:{}",
            config.rpc_host, config.node_rpc_port
        ),
        "--log-level=1".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_launch() {
        let config = ShellConfig::rooted("/home/u/fuego", "/opt/fuego");
        let launch = LaunchSpec::for_kind(DaemonKind::Node, &config);
        assert!(launch.program.starts_with("/opt/fuego"));
        assert!(launch.program.to_string_lossy().contains("fuegod"));
        assert_eq!(
            launch.args,
            vec![
                "--data-dir=/home/u/fuego/fuego-data",
                "--rpc-bind-port=18081",
                "--restricted-rpc",
                "--enable-cors=*",
                "--log-level=1",
            ]
        );
    }

    #[test]
    fn test_wallet_launch() {
        let mut config = ShellConfig::rooted("/home/u/fuego", "/opt/fuego");
        config.wallet_rpc_port = 28082;
        let launch = LaunchSpec::for_kind(DaemonKind::Wallet, &config);
        assert!(launch.program.to_string_lossy().contains("walletd"));
        assert_eq!(
            launch.args,
            vec![
                "--container-file=/home/u/fuego/wallets/wallet.bin",
                "--container-password=",
                "--rpc-bind-port=28082",
                "--daemon-address=127.0.0.1:18081",
                "--log-level=1",
            ]
        );
    }

    #[test]
    fn test_launch_is_deterministic() {
        let config = ShellConfig::rooted("/a", "/b");
        assert_eq!(
            LaunchSpec::for_kind(DaemonKind::Wallet, &config),
            LaunchSpec::for_kind(DaemonKind::Wallet, &config)
        );
    }
}
