//! UI bridge: NDJSON requests, responses and pushed events over a UNIX socket.
//!
//! CHANGELOG:
//! - 10/12/2026 - Initial module structure

pub mod protocol;
pub mod server;

pub use protocol::{EventFrame, Request, Response, ServerFrame};
pub use server::BridgeServer;

use std::path::{Path, PathBuf};

/// Socket file name under the shell home.
pub const SOCKET_NAME: &str = "fuego-desktop.sock";
/// Pid file written next to the socket in background mode.
pub const PID_NAME: &str = "fuego-desktop.pid";

/// Default socket location: `<home>/fuego-desktop.sock`.
pub fn default_socket_path(home: &Path) -> PathBuf {
    home.join(SOCKET_NAME)
}

/// Pid file that belongs to `socket_path`.
pub fn pid_path_for(socket_path: &Path) -> PathBuf {
    socket_path.with_file_name(PID_NAME)
}
