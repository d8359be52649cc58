//! Supervisor for the fuegod and walletd child processes.
//!
//! Owns the process handles and readiness flags. Command handlers read them
//! through the accessors; only the supervisor mutates them.
//!
//! CHANGELOG:
//! - 10/15/2026 - Readiness-triggered wallet start and address fetch (no fixed delays)
//! - 10/13/2026 - Generation numbers so a late exit never clears a newer handle
//! - 10/12/2026 - Initial implementation

use std::collections::HashMap;
use std::process::{ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::launch::LaunchSpec;
use super::status::{first_address, NodeStatus, WalletStatus};
use super::{DaemonKind, ShellEvent};
use crate::config::ShellConfig;
use crate::error::{Result, ShellError};
use crate::rpc::RpcClient;

/// Capacity of the event channel. Subscribers that fall further behind lose
/// the oldest events.
const EVENT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StartStatus {
    Starting,
    AlreadyRunning,
}

/// Result of [`Supervisor::start`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartOutcome {
    pub status: StartStatus,
    pub message: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StopStatus {
    Stopped,
    NotRunning,
}

/// Result of [`Supervisor::stop`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopOutcome {
    pub status: StopStatus,
    pub message: String,
}

/// Point-in-time view of one daemon, for `health`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSnapshot {
    pub kind: DaemonKind,
    pub running: bool,
    pub ready: bool,
    pub pid: Option<u32>,
    pub port: u16,
    pub started_at: Option<DateTime<Utc>>,
}

/// One live child process.
struct LiveDaemon {
    generation: u64,
    pid: Option<u32>,
    port: u16,
    started_at: DateTime<Utc>,
    /// Dropping or firing this makes the exit watcher terminate the child.
    stop_tx: Option<oneshot::Sender<()>>,
    exit_task: Option<JoinHandle<()>>,
}

struct Inner {
    config: Arc<ShellConfig>,
    rpc: RpcClient,
    events: broadcast::Sender<ShellEvent>,
    handles: Mutex<HashMap<DaemonKind, LiveDaemon>>,
    readiness: HashMap<DaemonKind, watch::Sender<bool>>,
    generation: AtomicU64,
    started_at: DateTime<Utc>,
}

/// Process-wide session state: daemon handles, readiness, event channel.
///
/// Created once with [`Supervisor::init`] and released with
/// [`Supervisor::teardown`]. Clones share the same state.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

impl Supervisor {
    /// Build the session state. No daemon is started.
    pub fn init(config: ShellConfig) -> Result<Self> {
        let rpc = RpcClient::new(config.rpc_host.clone(), config.rpc_timeout)?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let readiness = DaemonKind::ALL
            .iter()
            .map(|kind| (*kind, watch::channel(false).0))
            .collect();

        Ok(Self {
            inner: Arc::new(Inner {
                config: Arc::new(config),
                rpc,
                events,
                handles: Mutex::new(HashMap::new()),
                readiness,
                generation: AtomicU64::new(0),
                started_at: Utc::now(),
            }),
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.inner.config
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.inner.rpc
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.inner.events.subscribe()
    }

    /// Publish an event. Having no subscriber is not an error.
    pub fn emit(&self, event: ShellEvent) {
        let _ = self.inner.events.send(event);
    }

    fn lock_handles(&self) -> MutexGuard<'_, HashMap<DaemonKind, LiveDaemon>> {
        self.inner
            .handles
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_ready_flag(&self, kind: DaemonKind, ready: bool) {
        if let Some(tx) = self.inner.readiness.get(&kind) {
            tx.send_replace(ready);
        }
    }

    fn is_current(&self, kind: DaemonKind, generation: u64) -> bool {
        self.lock_handles()
            .get(&kind)
            .map(|live| live.generation == generation)
            .unwrap_or(false)
    }

    pub fn is_running(&self, kind: DaemonKind) -> bool {
        self.lock_handles().contains_key(&kind)
    }

    pub fn is_ready(&self, kind: DaemonKind) -> bool {
        self.inner
            .readiness
            .get(&kind)
            .map(|tx| *tx.borrow())
            .unwrap_or(false)
    }

    pub fn snapshot(&self, kind: DaemonKind) -> DaemonSnapshot {
        let handles = self.lock_handles();
        let live = handles.get(&kind);
        DaemonSnapshot {
            kind,
            running: live.is_some(),
            ready: live.is_some() && self.is_ready(kind),
            pid: live.and_then(|l| l.pid),
            port: live
                .map(|l| l.port)
                .unwrap_or_else(|| kind.rpc_port(&self.inner.config)),
            started_at: live.map(|l| l.started_at),
        }
    }

    /// Start a daemon. Idempotent: a live handle yields `already-running`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self, kind: DaemonKind) -> Result<StartOutcome> {
        let port = kind.rpc_port(&self.inner.config);
        let mut handles = self.lock_handles();

        if handles.contains_key(&kind) {
            drop(handles);
            self.emit(ShellEvent::Log {
                kind,
                line: format!("{} already running", kind),
            });
            return Ok(StartOutcome {
                status: StartStatus::AlreadyRunning,
                message: format!("{} is already running", kind),
                port,
            });
        }

        let launch = LaunchSpec::for_kind(kind, &self.inner.config);
        info!(%kind, program = %launch.program.display(), "starting daemon");

        let mut child = Command::new(&launch.program)
            .args(&launch.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ShellError::Spawn { kind, source })?;

        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let pid = child.id();
        let ready = Arc::new(AtomicBool::new(false));

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(self.clone().pump_stdout(kind, generation, ready, stdout));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(self.clone().pump_stderr(kind, stderr));
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let exit_task = tokio::spawn(self.clone().watch_exit(kind, generation, child, stop_rx));

        handles.insert(
            kind,
            LiveDaemon {
                generation,
                pid,
                port,
                started_at: Utc::now(),
                stop_tx: Some(stop_tx),
                exit_task: Some(exit_task),
            },
        );
        self.set_ready_flag(kind, false);
        drop(handles);

        info!(%kind, ?pid, port, "daemon spawned");
        Ok(StartOutcome {
            status: StartStatus::Starting,
            message: format!("{} is starting...", kind),
            port,
        })
    }

    /// Stop a daemon. The handle is released immediately; the `Stopped` event
    /// follows once the process has actually exited.
    pub fn stop(&self, kind: DaemonKind) -> StopOutcome {
        let live = self.lock_handles().remove(&kind);

        match live {
            None => StopOutcome {
                status: StopStatus::NotRunning,
                message: format!("{} is not running", kind),
            },
            Some(mut live) => {
                self.set_ready_flag(kind, false);
                if let Some(tx) = live.stop_tx.take() {
                    let _ = tx.send(());
                }
                info!(%kind, pid = ?live.pid, "stop requested");
                StopOutcome {
                    status: StopStatus::Stopped,
                    message: format!("{} stopped successfully", kind),
                }
            }
        }
    }

    /// Stop every daemon and wait (bounded) for the processes to exit.
    pub async fn teardown(&self) {
        let live: Vec<(DaemonKind, LiveDaemon)> = self.lock_handles().drain().collect();
        let mut watchers = Vec::new();

        for (kind, mut daemon) in live {
            self.set_ready_flag(kind, false);
            if let Some(tx) = daemon.stop_tx.take() {
                let _ = tx.send(());
            }
            if let Some(task) = daemon.exit_task.take() {
                watchers.push((kind, task));
            }
        }

        let limit = self.inner.config.stop_grace + Duration::from_secs(2);
        for (kind, task) in watchers {
            if tokio::time::timeout(limit, task).await.is_err() {
                warn!(%kind, "daemon still running after teardown");
            }
        }
        info!("supervisor torn down");
    }

    /// Wait until `kind` reports ready.
    pub async fn wait_ready(&self, kind: DaemonKind, timeout: Duration) -> Result<()> {
        let mut rx = match self.inner.readiness.get(&kind) {
            Some(tx) => tx.subscribe(),
            None => return Err(ShellError::ReadyTimeout(kind)),
        };

        let waited = tokio::time::timeout(timeout, async {
            rx.wait_for(|ready| *ready).await.map(|_| ())
        })
        .await;
        match waited {
            Ok(Ok(())) => Ok(()),
            _ => Err(ShellError::ReadyTimeout(kind)),
        }
    }

    /// Node status; quiescent unless the node is live, ready and answering.
    pub async fn node_status(&self) -> NodeStatus {
        if !self.is_running(DaemonKind::Node) || !self.is_ready(DaemonKind::Node) {
            return NodeStatus::quiescent();
        }
        match self
            .inner
            .rpc
            .call_no_params(self.inner.config.node_rpc_port, "getinfo")
            .await
        {
            Ok(info) => NodeStatus::from_getinfo(&info),
            Err(_) => NodeStatus::quiescent(),
        }
    }

    /// Wallet status; same policy as [`Supervisor::node_status`].
    pub async fn wallet_status(&self) -> WalletStatus {
        if !self.is_running(DaemonKind::Wallet) || !self.is_ready(DaemonKind::Wallet) {
            return WalletStatus::quiescent();
        }
        match self
            .inner
            .rpc
            .call_no_params(self.inner.config.wallet_rpc_port, "getStatus")
            .await
        {
            Ok(status) => WalletStatus::from_get_status(&status),
            Err(_) => WalletStatus::quiescent(),
        }
    }

    // ========================================================================
    // Child process tasks
    // ========================================================================

    async fn pump_stdout<R>(self, kind: DaemonKind, generation: u64, ready: Arc<AtomicBool>, stdout: R)
    where
        R: AsyncRead + Unpin,
    {
        read_lines(kind, stdout, |line| {
            debug!(target: "fuego_desktop::daemon::stdout", %kind, "{}", line);
            let marker = kind.is_ready_line(&line);
            self.emit(ShellEvent::Log { kind, line });
            if marker && !ready.swap(true, Ordering::SeqCst) {
                self.on_ready(kind, generation);
            }
        })
        .await;
    }

    async fn pump_stderr<R>(self, kind: DaemonKind, stderr: R)
    where
        R: AsyncRead + Unpin,
    {
        read_lines(kind, stderr, |line| {
            debug!(target: "fuego_desktop::daemon::stderr", %kind, "{}", line);
            self.emit(ShellEvent::Error { kind, line });
        })
        .await;
    }

    async fn watch_exit(
        self,
        kind: DaemonKind,
        generation: u64,
        mut child: Child,
        mut stop_rx: oneshot::Receiver<()>,
    ) {
        let grace = self.inner.config.stop_grace;
        let status = tokio::select! {
            status = child.wait() => status,
            _ = &mut stop_rx => terminate(&mut child, kind, grace).await,
        };

        let code = match status {
            Ok(status) => status.code(),
            Err(e) => {
                warn!(%kind, "failed to collect exit status: {}", e);
                None
            }
        };
        info!(%kind, ?code, "daemon exited");

        {
            let mut handles = self.lock_handles();
            if handles.get(&kind).map(|l| l.generation) == Some(generation) {
                handles.remove(&kind);
                self.set_ready_flag(kind, false);
            }
        }
        self.emit(ShellEvent::Stopped { kind, code });
    }

    fn on_ready(&self, kind: DaemonKind, generation: u64) {
        if !self.is_current(kind, generation) {
            return;
        }
        info!(%kind, "daemon ready");
        self.set_ready_flag(kind, true);
        self.emit(ShellEvent::Ready { kind });

        match kind {
            DaemonKind::Node if self.inner.config.auto_start_wallet => {
                if let Err(e) = self.start(DaemonKind::Wallet) {
                    error!("Failed to auto-start wallet: {}", e);
                    self.emit(ShellEvent::Error {
                        kind: DaemonKind::Wallet,
                        line: e.to_string(),
                    });
                }
            }
            DaemonKind::Wallet => {
                tokio::spawn(self.clone().load_wallet_info(generation));
            }
            DaemonKind::Node => {}
        }
    }

    /// Fetch the primary address once walletd is ready and publish it.
    ///
    /// The readiness line can precede the RPC listener, so transport errors
    /// are retried a bounded number of times.
    async fn load_wallet_info(self, generation: u64) {
        let port = self.inner.config.wallet_rpc_port;
        let attempts = self.inner.config.wallet_info_attempts.max(1);

        for attempt in 1..=attempts {
            if !self.is_current(DaemonKind::Wallet, generation) {
                return;
            }
            match self.inner.rpc.call_no_params(port, "getAddresses").await {
                Ok(result) => {
                    match first_address(&result) {
                        Some(address) => self.emit(ShellEvent::WalletInfo {
                            address,
                            has_wallet: true,
                        }),
                        None => debug!("wallet reported no addresses"),
                    }
                    return;
                }
                Err(e) if e.is_transport() && attempt < attempts => {
                    debug!(attempt, "wallet RPC not answering yet: {}", e);
                    tokio::time::sleep(self.inner.config.wallet_info_interval).await;
                }
                Err(e) => {
                    warn!("Failed to load wallet info: {}", e);
                    return;
                }
            }
        }
    }
}

/// Feed each line of `reader` to `on_line`, decoding lossily so a daemon that
/// prints invalid UTF-8 does not stall its pipe.
async fn read_lines<R, F>(kind: DaemonKind, reader: R, mut on_line: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(String),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf)
                    .trim_end_matches(|c| c == '\r' || c == '\n')
                    .to_string();
                on_line(line);
            }
            Err(e) => {
                warn!(%kind, "output read error: {}", e);
                break;
            }
        }
    }
}

/// SIGTERM, then SIGKILL after `grace`.
async fn terminate(child: &mut Child, kind: DaemonKind, grace: Duration) -> std::io::Result<ExitStatus> {
    let Some(pid) = child.id() else {
        return child.wait().await;
    };

    #[cfg(unix)]
    {
        debug!(%kind, pid, "sending SIGTERM");
        unsafe {
            libc::kill(pid as libc::pid_t, libc::SIGTERM);
        }
        if let Ok(status) = tokio::time::timeout(grace, child.wait()).await {
            return status;
        }
        warn!(%kind, pid, "no exit after SIGTERM, killing");
    }
    #[cfg(not(unix))]
    let _ = grace;

    child.kill().await?;
    child.wait().await
}
