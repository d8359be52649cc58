//! Shared fixtures: a mock JSON-RPC daemon, shell-script fake daemons, and
//! event helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::broadcast;

use fuego_desktop::{ShellConfig, ShellEvent};

/// Serializes tests that write and then execute scripts; a concurrent fork
/// holding the script's write descriptor makes exec fail with ETXTBSY.
static SERIAL: Mutex<()> = Mutex::new(());

pub fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
enum Reply {
    Result(Value),
    Error(i64, String),
}

/// In-process stand-in for walletd/fuegod's `/json_rpc` endpoint.
#[derive(Clone, Default)]
pub struct MockRpc {
    replies: Arc<Mutex<HashMap<String, Reply>>>,
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MockRpc {
    pub fn respond(&self, method: &str, result: Value) {
        self.replies
            .lock()
            .unwrap()
            .insert(method.to_string(), Reply::Result(result));
    }

    pub fn fail(&self, method: &str, code: i64, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(method.to_string(), Reply::Error(code, message.to_string()));
    }

    /// `(method, params)` in arrival order.
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(m, _)| m).collect()
    }

    /// Params of the last call to `method`.
    pub fn last_params(&self, method: &str) -> Option<Value> {
        self.calls()
            .into_iter()
            .rev()
            .find(|(m, _)| m == method)
            .map(|(_, p)| p)
    }
}

async fn json_rpc(State(mock): State<MockRpc>, Json(body): Json<Value>) -> Json<Value> {
    let method = body["method"].as_str().unwrap_or_default().to_string();
    let id = body["id"].clone();
    mock.calls
        .lock()
        .unwrap()
        .push((method.clone(), body["params"].clone()));

    let reply = mock.replies.lock().unwrap().get(&method).cloned();
    let envelope = match reply {
        Some(Reply::Result(result)) => json!({"jsonrpc": "2.0", "id": id, "result": result}),
        Some(Reply::Error(code, message)) => {
            json!({"jsonrpc": "2.0", "id": id, "error": {"code": code, "message": message}})
        }
        None => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": -32601, "message": "Method not found"}
        }),
    };
    Json(envelope)
}

/// Start a mock daemon on an ephemeral port.
pub async fn spawn_mock_rpc() -> (u16, MockRpc) {
    let mock = MockRpc::default();
    let app = Router::new()
        .route("/json_rpc", post(json_rpc))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (port, mock)
}

/// A port with nothing listening on it.
pub fn dead_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Write an executable `/bin/sh` script.
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    {
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "#!/bin/sh").unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.sync_all().unwrap();
    }
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Fake fuegod that becomes ready and then idles.
pub fn fake_node(bin: &Path) -> PathBuf {
    write_script(
        bin,
        "fuegod",
        "echo \"Loading blockchain...\"\necho \"Core initialized OK\"\nexec sleep 30\n",
    )
}

/// Fake walletd that becomes ready and then idles.
pub fn fake_wallet(bin: &Path) -> PathBuf {
    write_script(
        bin,
        "walletd",
        "echo \"Loading container...\"\necho \"walletd started\"\nexec sleep 30\n",
    )
}

/// Config rooted in `home` with binaries from `home/bin` and short timings.
pub fn test_config(home: &Path, node_port: u16, wallet_port: u16) -> ShellConfig {
    let mut config = ShellConfig::rooted(home, home.join("bin"));
    config.node_rpc_port = node_port;
    config.wallet_rpc_port = wallet_port;
    config.rpc_timeout = Duration::from_secs(5);
    config.stop_grace = Duration::from_secs(2);
    config.auto_start_wallet = false;
    config.wallet_info_attempts = 40;
    config.wallet_info_interval = Duration::from_millis(50);
    config
}

/// Wait for the first event called `name`, skipping everything else.
pub async fn expect_event(
    events: &mut broadcast::Receiver<ShellEvent>,
    name: &str,
    timeout: Duration,
) -> ShellEvent {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if event.name() == name => return event,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    };
    tokio::time::timeout(timeout, wait)
        .await
        .unwrap_or_else(|_| panic!("no {} event within {:?}", name, timeout))
}

/// Everything published during the next `window`.
pub async fn drain_for(
    events: &mut broadcast::Receiver<ShellEvent>,
    window: Duration,
) -> Vec<ShellEvent> {
    let mut seen = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    while let Ok(Ok(event)) = tokio::time::timeout_at(deadline, events.recv()).await {
        seen.push(event);
    }
    seen
}
