//! fuego-desktop - desktop shell backend for the Fuego node and wallet.
//!
//! Supervises fuegod and walletd, serves the UI bridge on a UNIX socket, and
//! tears everything down on SIGINT/SIGTERM.
//!
//! CHANGELOG:
//! - 10/15/2026 - Background mode with pid file, stop/status subcommands
//! - 10/12/2026 - Initial CLI

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, warn};

use fuego_desktop::bridge::{self, BridgeServer};
use fuego_desktop::config::{expand_path, RunMode, ShellConfig};
use fuego_desktop::daemon::{DaemonKind, ShellEvent, Supervisor};
use fuego_desktop::logging;

/// Desktop shell backend: supervises fuegod and walletd and bridges them to a UI.
#[derive(Parser, Debug)]
#[command(name = "fuego-desktop")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct Location {
    /// Base directory for node data, wallets and exports
    #[arg(long)]
    home: Option<String>,

    /// Bridge socket path (default: <home>/fuego-desktop.sock)
    #[arg(long)]
    socket: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    #[command(flatten)]
    location: Location,

    /// Development mode: daemon binaries from ./build/src
    #[arg(long)]
    dev: bool,

    /// Directory holding fuegod, walletd and xfg-stark
    #[arg(long)]
    binaries_dir: Option<String>,

    /// Node RPC port
    #[arg(long)]
    node_port: Option<u16>,

    /// Wallet RPC port
    #[arg(long)]
    wallet_port: Option<u16>,

    /// Do not start the node at launch
    #[arg(long)]
    no_autostart: bool,

    /// Fork into the background (pid file next to the socket)
    #[arg(long)]
    background: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the shell in the foreground (or background with --background)
    Run(RunArgs),

    /// Stop a background shell
    Stop(Location),

    /// Check whether a shell is serving the bridge socket
    Status(Location),

    /// Print resolved directories and binary paths
    Paths(RunArgs),
}

// ============================================================================
// Configuration
// ============================================================================

fn build_config(args: &RunArgs) -> Result<ShellConfig> {
    let mut config = ShellConfig::from_env()?;

    if args.dev {
        config.mode = RunMode::Development;
    }
    if let Some(ref home) = args.location.home {
        config.home = expand_path(home);
    }
    if let Some(ref dir) = args.binaries_dir {
        config.binaries_dir = Some(expand_path(dir));
    }
    if let Some(port) = args.node_port {
        config.node_rpc_port = port;
    }
    if let Some(port) = args.wallet_port {
        config.wallet_rpc_port = port;
    }
    if args.no_autostart {
        config.auto_start_node = false;
    }

    Ok(config)
}

fn home_for(location: &Location) -> Result<PathBuf> {
    match location.home {
        Some(ref home) => Ok(expand_path(home)),
        None => Ok(ShellConfig::from_env()?.home),
    }
}

fn socket_for(location: &Location, home: &Path) -> PathBuf {
    match location.socket {
        Some(ref socket) => expand_path(socket),
        None => bridge::default_socket_path(home),
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn cmd_run(args: RunArgs, verbose: u8) -> Result<()> {
    let mut config = build_config(&args)?;
    config.pin_paths()?;
    config.ensure_dirs()?;
    let mut socket_path = socket_for(&args.location, &config.home);
    if socket_path.is_relative() {
        socket_path = std::env::current_dir()
            .context("Failed to read current directory")?
            .join(socket_path);
    }
    let pid_file = bridge::pid_path_for(&socket_path);

    if args.background {
        use daemonize::Daemonize;

        let log_path = config.home.join("fuego-desktop.log");
        let log_file = std::fs::File::create(&log_path)
            .with_context(|| format!("Failed to create log file: {:?}", log_path))?;

        Daemonize::new()
            .pid_file(&pid_file)
            .working_directory(&config.home)
            .stderr(log_file)
            .start()
            .context("Failed to daemonize")?;
    }

    logging::init(verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;
    let outcome = runtime.block_on(serve(config, socket_path));

    if args.background {
        let _ = std::fs::remove_file(&pid_file);
    }
    outcome
}

async fn serve(config: ShellConfig, socket_path: PathBuf) -> Result<()> {
    info!(
        home = %config.home.display(),
        binaries = %config.binaries_root().display(),
        "starting fuego-desktop"
    );
    let auto_start = config.auto_start_node;

    let supervisor = Supervisor::init(config)?;
    let server = BridgeServer::bind(supervisor.clone(), &socket_path).await?;

    if auto_start {
        if let Err(e) = supervisor.start(DaemonKind::Node) {
            error!("Failed to start node: {}", e);
            supervisor.emit(ShellEvent::Error {
                kind: DaemonKind::Node,
                line: e.to_string(),
            });
        }
    }

    server.serve(shutdown_signal()).await?;
    supervisor.teardown().await;
    info!("fuego-desktop stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}

fn cmd_stop(location: Location) -> Result<()> {
    let home = home_for(&location)?;
    let socket_path = socket_for(&location, &home);
    let pid_file = bridge::pid_path_for(&socket_path);

    let pid_str = std::fs::read_to_string(&pid_file)
        .with_context(|| format!("No pid file at {:?}; is the shell running in the background?", pid_file))?;
    let pid: i32 = pid_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid pid file contents: {:?}", pid_str.trim()))?;

    // The shell tears down its daemons and removes the socket itself.
    let rc = unsafe { libc::kill(pid, libc::SIGTERM) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        let _ = std::fs::remove_file(&pid_file);
        return Err(err).with_context(|| format!("Failed to signal pid {}", pid));
    }

    println!("fuego-desktop stopping (pid {})", pid);
    Ok(())
}

fn cmd_status(location: Location) -> Result<bool> {
    let home = home_for(&location)?;
    let socket_path = socket_for(&location, &home);

    match std::os::unix::net::UnixStream::connect(&socket_path) {
        Ok(_) => {
            println!("fuego-desktop running at {}", socket_path.display());
            Ok(true)
        }
        Err(_) => {
            println!("fuego-desktop not running");
            Ok(false)
        }
    }
}

fn cmd_paths(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let socket_path = socket_for(&args.location, &config.home);

    let paths = json!({
        "mode": format!("{:?}", config.mode).to_lowercase(),
        "home": config.home,
        "data_dir": config.data_dir(),
        "wallet_file": config.wallet_file(),
        "export_dir": config.export_dir(),
        "binaries_root": config.binaries_root(),
        "fuegod": config.binary_path(DaemonKind::Node.binary_name()),
        "walletd": config.binary_path(DaemonKind::Wallet.binary_name()),
        "socket": socket_path,
        "node_rpc_port": config.node_rpc_port,
        "wallet_rpc_port": config.wallet_rpc_port,
    });
    println!("{}", serde_json::to_string_pretty(&paths)?);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => cmd_run(args, cli.verbose),
        Command::Stop(location) => cmd_stop(location),
        Command::Status(location) => match cmd_status(location) {
            Ok(true) => Ok(()),
            Ok(false) => return ExitCode::from(1),
            Err(e) => Err(e),
        },
        Command::Paths(args) => cmd_paths(args),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
