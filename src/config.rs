//! Shell configuration: directories, binary roots, ports and timeouts.
//!
//! Resolution order for every setting: built-in default, then environment
//! variable, then command-line flag (applied by the binary).
//!
//! CHANGELOG:
//! - 10/14/2026 - Added secret confirmation and placeholder proof switches
//! - 10/12/2026 - Initial implementation

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_NODE_RPC_PORT: u16 = 18081;
pub const DEFAULT_WALLET_RPC_PORT: u16 = 18082;

const APP_DIR_NAME: &str = "fuego-desktop";
const WALLET_FILE_NAME: &str = "wallet.bin";

/// Where the daemon binaries are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Binaries from a local build tree (`<cwd>/build/src`).
    Development,
    /// Binaries packaged next to the shell (`<exe dir>/binaries`).
    Production,
}

#[derive(Debug, Clone)]
pub struct ShellConfig {
    pub mode: RunMode,
    /// Explicit binary root; overrides the mode-derived one.
    pub binaries_dir: Option<PathBuf>,
    /// Base directory holding node data, wallets and exports.
    pub home: PathBuf,
    pub rpc_host: String,
    pub node_rpc_port: u16,
    pub wallet_rpc_port: u16,
    pub rpc_timeout: Duration,
    /// Time between SIGTERM and a hard kill when stopping a daemon.
    pub stop_grace: Duration,
    pub auto_start_node: bool,
    pub auto_start_wallet: bool,
    /// Attempts to fetch the wallet address once walletd reports ready.
    pub wallet_info_attempts: u32,
    pub wallet_info_interval: Duration,
    /// Require `"confirm": true` before returning mnemonic or keys.
    pub require_secret_confirmation: bool,
    /// Only honoured by builds with the `placeholder-proofs` feature.
    pub placeholder_proofs: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Production,
            binaries_dir: None,
            home: default_home(),
            rpc_host: "127.0.0.1".to_string(),
            node_rpc_port: DEFAULT_NODE_RPC_PORT,
            wallet_rpc_port: DEFAULT_WALLET_RPC_PORT,
            rpc_timeout: Duration::from_secs(30),
            stop_grace: Duration::from_secs(10),
            auto_start_node: true,
            auto_start_wallet: true,
            wallet_info_attempts: 10,
            wallet_info_interval: Duration::from_secs(1),
            require_secret_confirmation: true,
            placeholder_proofs: false,
        }
    }
}

/// Default base directory.
///
/// - macOS: `~/Library/Application Support/fuego-desktop`
/// - Linux: `~/.local/share/fuego-desktop`
/// - Windows: `%APPDATA%\fuego-desktop`
pub fn default_home() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Expand `~` in a user-supplied path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).to_string())
}

impl ShellConfig {
    /// Defaults overlaid with `FUEGO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(home) = std::env::var("FUEGO_DESKTOP_HOME") {
            config.home = expand_path(&home);
        }
        if let Ok(dir) = std::env::var("FUEGO_BINARIES_DIR") {
            config.binaries_dir = Some(expand_path(&dir));
        }
        if let Ok(port) = std::env::var("FUEGO_NODE_RPC_PORT") {
            config.node_rpc_port = port
                .parse()
                .with_context(|| format!("Invalid FUEGO_NODE_RPC_PORT: {}", port))?;
        }
        if let Ok(port) = std::env::var("FUEGO_WALLET_RPC_PORT") {
            config.wallet_rpc_port = port
                .parse()
                .with_context(|| format!("Invalid FUEGO_WALLET_RPC_PORT: {}", port))?;
        }

        Ok(config)
    }

    /// Everything rooted under `home`, binaries taken from `binaries_dir`.
    pub fn rooted(home: impl Into<PathBuf>, binaries_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: RunMode::Development,
            binaries_dir: Some(binaries_dir.into()),
            home: home.into(),
            ..Self::default()
        }
    }

    /// Node state directory.
    pub fn data_dir(&self) -> PathBuf {
        self.home.join("fuego-data")
    }

    pub fn wallet_dir(&self) -> PathBuf {
        self.home.join("wallets")
    }

    /// Destination for `save-file` requests with relative names.
    pub fn export_dir(&self) -> PathBuf {
        self.home.join("exports")
    }

    /// The wallet container (`wallet.bin`).
    pub fn wallet_file(&self) -> PathBuf {
        self.wallet_dir().join(WALLET_FILE_NAME)
    }

    /// Container plus the `.keys` and `.address.txt` sidecars walletd writes.
    pub fn wallet_files(&self) -> Vec<PathBuf> {
        let container = self.wallet_file();
        let mut keys = container.clone().into_os_string();
        keys.push(".keys");
        let mut address = container.clone().into_os_string();
        address.push(".address.txt");
        vec![container, PathBuf::from(keys), PathBuf::from(address)]
    }

    /// Directory the daemon binaries are resolved from.
    pub fn binaries_root(&self) -> PathBuf {
        if let Some(ref dir) = self.binaries_dir {
            return dir.clone();
        }
        match self.mode {
            RunMode::Development => std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join("build")
                .join("src"),
            RunMode::Production => std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("binaries"),
        }
    }

    /// Full path of an external binary (`fuegod`, `walletd`, `xfg-stark`).
    pub fn binary_path(&self, name: &str) -> PathBuf {
        self.binaries_root()
            .join(format!("{}{}", name, std::env::consts::EXE_SUFFIX))
    }

    /// Resolve the home directory and binary root against the current
    /// working directory and fix them in place.
    ///
    /// Must run before daemonizing: the background process changes its
    /// working directory, which would re-root relative paths and the
    /// development binary root.
    pub fn pin_paths(&mut self) -> Result<()> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let absolute = |path: &Path| {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                cwd.join(path)
            }
        };

        self.home = absolute(&self.home);
        self.binaries_dir = Some(absolute(&self.binaries_root()));
        Ok(())
    }

    /// Create the node, wallet and export directories if missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.data_dir(), self.wallet_dir(), self.export_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {:?}", dir))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::default();
        assert_eq!(config.node_rpc_port, 18081);
        assert_eq!(config.wallet_rpc_port, 18082);
        assert_eq!(config.rpc_host, "127.0.0.1");
        assert!(config.require_secret_confirmation);
        assert!(!config.placeholder_proofs);
        assert!(config.home.ends_with("fuego-desktop"));
    }

    #[test]
    fn test_layout_under_home() {
        let config = ShellConfig::rooted("/tmp/fuego-home", "/tmp/fuego-bin");
        assert_eq!(config.data_dir(), PathBuf::from("/tmp/fuego-home/fuego-data"));
        assert_eq!(config.wallet_dir(), PathBuf::from("/tmp/fuego-home/wallets"));
        assert_eq!(
            config.wallet_file(),
            PathBuf::from("/tmp/fuego-home/wallets/wallet.bin")
        );
    }

    #[test]
    fn test_wallet_sidecars() {
        let config = ShellConfig::rooted("/w", "/b");
        let files = config.wallet_files();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/w/wallets/wallet.bin"),
                PathBuf::from("/w/wallets/wallet.bin.keys"),
                PathBuf::from("/w/wallets/wallet.bin.address.txt"),
            ]
        );
    }

    #[test]
    fn test_explicit_binaries_dir_wins() {
        let mut config = ShellConfig::rooted("/w", "/opt/fuego/bin");
        config.mode = RunMode::Production;
        assert_eq!(config.binaries_root(), PathBuf::from("/opt/fuego/bin"));
        assert!(config.binary_path("fuegod").starts_with("/opt/fuego/bin"));
    }

    #[test]
    fn test_mode_roots() {
        let mut config = ShellConfig::default();
        config.mode = RunMode::Development;
        assert!(config.binaries_root().ends_with("build/src"));
        config.mode = RunMode::Production;
        assert!(config.binaries_root().ends_with("binaries"));
    }

    #[test]
    fn test_pin_paths_fixes_dev_root_and_relative_home() {
        let cwd = std::env::current_dir().unwrap();
        let mut config = ShellConfig::rooted("fuego-home", "unused");
        config.binaries_dir = None;
        config.mode = RunMode::Development;

        config.pin_paths().unwrap();
        assert_eq!(config.home, cwd.join("fuego-home"));
        assert_eq!(config.binaries_dir, Some(cwd.join("build").join("src")));
        assert_eq!(config.binaries_root(), cwd.join("build").join("src"));
    }

    #[test]
    fn test_pin_paths_keeps_absolute_dirs() {
        let mut config = ShellConfig::rooted("/w", "relative-bin");
        config.pin_paths().unwrap();
        assert_eq!(config.home, PathBuf::from("/w"));
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(config.binaries_dir, Some(cwd.join("relative-bin")));
    }

    #[test]
    fn test_ensure_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let config = ShellConfig::rooted(tmp.path(), tmp.path().join("bin"));
        config.ensure_dirs().unwrap();
        assert!(config.data_dir().is_dir());
        assert!(config.wallet_dir().is_dir());
        assert!(config.export_dir().is_dir());
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/fuego");
        assert!(!expanded.starts_with("~"));
    }
}
