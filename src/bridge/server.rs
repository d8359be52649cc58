//! UNIX socket server for the UI bridge.
//!
//! Each connection gets two tasks: one answers requests in order, the other
//! forwards supervisor events as they happen. Both share the write half.
//!
//! CHANGELOG:
//! - 10/14/2026 - Event forwarding per connection
//! - 10/12/2026 - Async rewrite on tokio, one task per connection

use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use super::protocol::{self, EventFrame, Request, Response};
use crate::commands;
use crate::daemon::{ShellEvent, Supervisor};

type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

/// Bridge server bound to a UNIX socket.
pub struct BridgeServer {
    supervisor: Supervisor,
    socket_path: PathBuf,
    listener: UnixListener,
}

impl BridgeServer {
    /// Bind the socket, replacing a stale one, with owner-only permissions.
    pub async fn bind(supervisor: Supervisor, socket_path: impl AsRef<Path>) -> Result<Self> {
        let socket_path = socket_path.as_ref().to_path_buf();

        if let Some(parent) = socket_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }
        // Clean up stale socket
        let _ = tokio::fs::remove_file(&socket_path).await;

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind {:?}", socket_path))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&socket_path, std::fs::Permissions::from_mode(0o600))?;
        }

        info!("bridge listening on {}", socket_path.display());
        Ok(Self {
            supervisor,
            socket_path,
            listener,
        })
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accept connections until `shutdown` completes, then remove the socket.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, _addr)) => {
                            let supervisor = self.supervisor.clone();
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, supervisor).await {
                                    warn!("connection error: {:#}", e);
                                }
                            });
                        }
                        Err(e) => error!("accept error: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    info!("bridge shutting down");
                    break;
                }
            }
        }

        let _ = std::fs::remove_file(&self.socket_path);
        Ok(())
    }
}

async fn write_line(writer: &SharedWriter, line: &str) -> std::io::Result<()> {
    let mut w = writer.lock().await;
    w.write_all(line.as_bytes()).await?;
    w.flush().await
}

/// Handle a single client connection until it disconnects.
async fn handle_connection(stream: UnixStream, supervisor: Supervisor) -> Result<()> {
    let events = supervisor.subscribe();
    let (reader, writer) = stream.into_split();
    let writer: SharedWriter = Arc::new(Mutex::new(writer));

    let event_task = tokio::spawn(forward_events(events, writer.clone()));

    let mut reader = BufReader::new(reader);
    let mut line = String::new();
    let outcome = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(anyhow::Error::from(e).context("Failed to read request")),
        }
        if line.trim().is_empty() {
            continue;
        }

        let response = answer(&supervisor, &line).await;
        let response_line = match response.to_ndjson_line() {
            Ok(l) => l,
            Err(e) => break Err(e),
        };
        if let Err(e) = write_line(&writer, &response_line).await {
            break Err(anyhow::Error::from(e).context("Failed to write response"));
        }
    };

    event_task.abort();
    outcome
}

/// Turn one request line into a response; never fails.
async fn answer(supervisor: &Supervisor, line: &str) -> Response {
    let start = Instant::now();
    let elapsed = |start: Instant| start.elapsed().as_secs_f64() * 1000.0;

    let request = match Request::from_ndjson_line(line) {
        Ok(request) => request,
        Err(e) => {
            debug!("bad request line: {:#}", e);
            return Response::error(String::new(), "BAD_REQUEST", format!("{:#}", e), elapsed(start));
        }
    };

    if request.v != protocol::PROTOCOL_VERSION {
        return Response::error(
            request.id,
            "UNSUPPORTED_VERSION",
            format!("Unsupported protocol version: {}", request.v),
            elapsed(start),
        );
    }

    let params = request.params_value();
    match commands::dispatch(supervisor, &request.method, params).await {
        Ok(result) => Response::success(request.id, result, elapsed(start)),
        Err(e) => Response::error(request.id, e.code(), e.to_string(), elapsed(start)),
    }
}

async fn forward_events(mut events: broadcast::Receiver<ShellEvent>, writer: SharedWriter) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let line = match EventFrame::from(&event).to_ndjson_line() {
                    Ok(line) => line,
                    Err(e) => {
                        error!("event serialize error: {}", e);
                        continue;
                    }
                };
                if write_line(&writer, &line).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!("event stream lagged, missed {} events", n);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
