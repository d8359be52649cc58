//! fuego-desktop library
//!
//! Supervises the fuegod and walletd daemons, relays their output to UI
//! clients, and forwards UI commands to them over JSON-RPC.
//!
//! CHANGELOG:
//! - 10/14/2026 - Bridge and client output modules
//! - 10/12/2026 - Initial library structure

pub mod amount;
pub mod bridge;
pub mod commands;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod output;
pub mod rpc;

pub use config::ShellConfig;
pub use daemon::{DaemonKind, ShellEvent, Supervisor};
pub use error::{Result, ShellError};
