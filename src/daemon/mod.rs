//! Daemon supervision: fuegod and walletd lifecycles, output relay, readiness.
//!
//! CHANGELOG:
//! - 10/13/2026 - Status snapshots and event types split out
//! - 10/12/2026 - Initial module structure

mod event;
mod kind;
mod launch;
mod status;
mod supervisor;

pub use event::ShellEvent;
pub use kind::DaemonKind;
pub use launch::LaunchSpec;
pub use status::{first_address, NodeStatus, WalletStatus};
pub use supervisor::{
    DaemonSnapshot, StartOutcome, StartStatus, StopOutcome, StopStatus, Supervisor,
};
