//! Server child process and its stdio pumps
//!
//! stdout and stderr are read line by line on their own tasks and funnelled
//! into one event channel, so the driver only ever waits on a single
//! receiver. The channel closes once both streams reach end of file.
//! Bytes that are not valid UTF-8 are replaced rather than rejected, so a
//! garbled line still reaches the conversation as an unparseable chunk.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::{HarnessConfig, API_KEY_VAR};
use crate::error::{SpawnError, TransportError};
use crate::mcp::types::JsonRpcRequest;

/// Something the server wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    Stdout(String),
    Stderr(String),
}

/// A running MCP server
pub struct ServerProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    events: mpsc::UnboundedReceiver<ServerEvent>,
    pumps: Vec<JoinHandle<()>>,
}

impl ServerProcess {
    /// Start the server described by `config`.
    ///
    /// The child inherits the harness environment; the API key variable is
    /// set to the configured key or the placeholder.
    pub fn spawn(config: &HarnessConfig) -> Result<Self, SpawnError> {
        let mut cmd = Command::new(&config.runtime);
        cmd.arg(config.server_path())
            .current_dir(&config.server_dir)
            .env(API_KEY_VAR, config.effective_api_key())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| SpawnError::Start {
            program: config.runtime.clone(),
            source,
        })?;
        tracing::info!(pid = ?child.id(), runtime = %config.runtime, "spawned server");

        let stdin = child
            .stdin
            .take()
            .ok_or(SpawnError::StreamNotCaptured { stream: "stdin" })?;
        let stdout = child
            .stdout
            .take()
            .ok_or(SpawnError::StreamNotCaptured { stream: "stdout" })?;
        let stderr = child
            .stderr
            .take()
            .ok_or(SpawnError::StreamNotCaptured { stream: "stderr" })?;

        let (tx, events) = mpsc::unbounded_channel();
        let pumps = vec![
            tokio::spawn(pump(stdout, tx.clone(), ServerEvent::Stdout)),
            tokio::spawn(pump(stderr, tx, ServerEvent::Stderr)),
        ];

        Ok(Self {
            child,
            stdin: Some(stdin),
            events,
            pumps,
        })
    }

    /// Write one request as a single JSON line
    pub async fn send(&mut self, request: &JsonRpcRequest) -> Result<(), TransportError> {
        let stdin = self.stdin.as_mut().ok_or(TransportError::StdinClosed)?;
        let mut line = serde_json::to_vec(request).map_err(|e| TransportError::Write {
            id: request.id,
            source: e.into(),
        })?;
        line.push(b'\n');

        tracing::debug!(id = request.id, method = %request.method, "sending request");
        let id = request.id;
        stdin
            .write_all(&line)
            .await
            .map_err(|source| TransportError::Write { id, source })?;
        stdin
            .flush()
            .await
            .map_err(|source| TransportError::Write { id, source })
    }

    /// Next line from the server, or `None` once both streams are closed
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        self.events.recv().await
    }

    /// Close stdin and give the server `grace` to exit before killing it
    pub async fn shutdown(&mut self, grace: Duration) -> std::io::Result<ExitStatus> {
        if let Some(mut stdin) = self.stdin.take() {
            if let Err(e) = stdin.shutdown().await {
                tracing::debug!("Error closing server stdin: {}", e);
            }
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                tracing::info!(grace_ms = grace.as_millis() as u64, "server still running, killing it");
                self.child.kill().await?;
                self.child.wait().await
            }
        }
    }

    /// Wait up to `limit` for the pumps to reach end of file, then stop them
    pub async fn drain(&mut self, limit: Duration) -> Vec<ServerEvent> {
        let mut rest = Vec::new();
        let collect = async {
            while let Some(event) = self.events.recv().await {
                rest.push(event);
            }
        };
        if tokio::time::timeout(limit, collect).await.is_err() {
            tracing::warn!("server output still open after exit, abandoning it");
        }
        for pump in self.pumps.drain(..) {
            pump.abort();
        }
        rest
    }
}

async fn pump<R>(stream: R, tx: mpsc::UnboundedSender<ServerEvent>, wrap: fn(String) -> ServerEvent)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(&['\r', '\n'][..]).to_string();
                if tx.send(wrap(line)).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!("Error reading from server: {}", e);
                break;
            }
        }
    }
}
