use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use super::protocol::{self, EngineCommand};
use crate::error::{HarnessError, HarnessResult};
use crate::events::{EventKind, EventLog, StreamSource, TranscriptEvent};

/// Configuration for one supervised engine process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Executable to spawn (e.g. a speech helper binary)
    pub command: String,

    /// Arguments passed to the executable
    #[serde(default)]
    pub args: Vec<String>,

    /// How long to wait for the engine's `ready` event
    #[serde(default = "default_ready_timeout_secs")]
    pub ready_timeout_secs: f64,

    /// Grace period between closing stdin and killing the process
    #[serde(default = "default_stop_grace_secs")]
    pub stop_grace_secs: f64,
}

fn default_ready_timeout_secs() -> f64 {
    10.0
}

fn default_stop_grace_secs() -> f64 {
    5.0
}

impl EngineConfig {
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            ready_timeout_secs: default_ready_timeout_secs(),
            stop_grace_secs: default_stop_grace_secs(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn ready_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.ready_timeout_secs.max(0.0))
    }

    #[must_use]
    pub fn stop_grace(&self) -> Duration {
        Duration::from_secs_f64(self.stop_grace_secs.max(0.0))
    }
}

/// A supervised engine subprocess.
///
/// Owns the child handle, its stdin, and the two reader tasks. All observed
/// output lives in the shared `EventLog`; callers interact through commands,
/// bounded waits, and snapshots. The supervisor never blocks its readers:
/// `wait_for_event` suspends only the calling context.
pub struct EngineProcess {
    config: EngineConfig,
    log: Arc<EventLog>,
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<ChildStdin>>,
    readers: Mutex<Vec<JoinHandle<()>>>,
}

impl EngineProcess {
    /// Spawn the engine and start both stream readers.
    ///
    /// Returns as soon as the process exists; it does not wait for the
    /// engine's `ready` event. Use `wait_ready` for that.
    pub fn spawn(config: EngineConfig) -> HarnessResult<Self> {
        info!(command = %config.command, "spawning engine process");

        let mut child = Command::new(&config.command)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| HarnessError::spawn(config.command.as_str(), e))?;

        let stdin = child.stdin.take().expect("stdin piped");
        let stdout = child.stdout.take().expect("stdout piped");
        let stderr = child.stderr.take().expect("stderr piped");

        let log = Arc::new(EventLog::new());

        // Structured stream: classify protocol JSON, keep going on bad lines.
        let structured_log = Arc::clone(&log);
        let structured = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let event = protocol::classify_line(trimmed, StreamSource::Structured);
                if event.kind == EventKind::Unrecognized {
                    trace!(line = %event.text, "unrecognized engine output");
                }
                structured_log.append(event);
            }
            debug!("structured reader reached end of stream");
        });

        // Diagnostic stream: free-form log text, never protocol-classified.
        let diagnostic_log = Arc::clone(&log);
        let diagnostic = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                trace!(line = %trimmed, "engine diagnostic");
                diagnostic_log.append(TranscriptEvent::unrecognized(
                    trimmed,
                    StreamSource::Diagnostic,
                ));
            }
            debug!("diagnostic reader reached end of stream");
        });

        Ok(Self {
            config,
            log,
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(stdin)),
            readers: Mutex::new(vec![structured, diagnostic]),
        })
    }

    /// The shared event log this process writes into.
    #[must_use]
    pub fn event_log(&self) -> Arc<EventLog> {
        Arc::clone(&self.log)
    }

    /// Send one `{"type":..,"data":..}` command line and flush it.
    ///
    /// Fire-and-forget with respect to the engine's reaction; the returned
    /// instant is captured just before the write, so any event the command
    /// causes is timestamped at or after it.
    pub async fn send_command(&self, kind: &str, payload: Option<Value>) -> HarnessResult<Instant> {
        let line = protocol::encode_command(kind, payload)?;

        let mut guard = self.stdin.lock().await;
        let stdin = guard.as_mut().ok_or_else(|| {
            HarnessError::CommandWrite(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "engine stdin already closed",
            ))
        })?;

        let sent_at = Instant::now();
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(HarnessError::CommandWrite)?;
        stdin.write_all(b"\n").await.map_err(HarnessError::CommandWrite)?;
        stdin.flush().await.map_err(HarnessError::CommandWrite)?;

        debug!(command = kind, "sent engine command");
        Ok(sent_at)
    }

    /// Typed variant of `send_command`.
    pub async fn send(&self, command: &EngineCommand) -> HarnessResult<Instant> {
        self.send_command(command.kind(), command.payload()).await
    }

    /// Block until an event of `kind` is in the log, bounded by `timeout`.
    ///
    /// An event already present at call time returns immediately; otherwise
    /// the call suspends until a matching append or expiry. Returns `None` on
    /// expiry, including when the process has exited and no more events can
    /// arrive.
    pub async fn wait_for_event(
        &self,
        kind: EventKind,
        timeout: Duration,
    ) -> Option<TranscriptEvent> {
        self.log.wait_for(kind, timeout).await
    }

    /// Like `wait_for_event`, restricted to events timestamped at or after
    /// `since`. Used for waits scoped to a session or command window.
    pub async fn wait_for_event_since(
        &self,
        kind: EventKind,
        since: Instant,
        timeout: Duration,
    ) -> Option<TranscriptEvent> {
        self.log.wait_for_since(kind, since, timeout).await
    }

    /// Consistent snapshot of events timestamped at or after `since`.
    #[must_use]
    pub fn events_since(&self, since: Instant) -> Vec<TranscriptEvent> {
        self.log.snapshot_since(since)
    }

    /// Wait for the engine's `ready` event.
    ///
    /// Startup expiry is the one fatal timeout in the harness; it surfaces as
    /// a startup failure rather than a missed-event `None`.
    pub async fn wait_ready(&self) -> HarnessResult<()> {
        let timeout = self.config.ready_timeout();
        match self.log.wait_for(EventKind::Ready, timeout).await {
            Some(_) => {
                info!("engine signalled ready");
                Ok(())
            }
            None => Err(HarnessError::StartupTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }

    /// Whether the child handle is still held (not yet stopped).
    pub async fn is_running(&self) -> bool {
        self.child.lock().await.is_some()
    }

    /// Shut the engine down.
    ///
    /// Closes stdin so a well-behaved engine can exit on its own, waits out
    /// the grace period, then kills. Idempotent, and safe to call from
    /// cleanup paths even when startup never reached ready: pending
    /// `wait_for_event` calls stay bounded by their own timeouts.
    pub async fn stop(&self) {
        self.stdin.lock().await.take();

        let child = self.child.lock().await.take();
        if let Some(mut child) = child {
            match tokio::time::timeout(self.config.stop_grace(), child.wait()).await {
                Ok(Ok(status)) => debug!(%status, "engine exited"),
                Ok(Err(e)) => warn!("failed waiting for engine exit: {e}"),
                Err(_) => {
                    warn!("engine did not exit within grace period, killing");
                    if let Err(e) = child.kill().await {
                        warn!("failed to kill engine: {e}");
                    }
                }
            }
        }

        let handles: Vec<JoinHandle<()>> = {
            let mut readers = self.readers.lock().await;
            readers.drain(..).collect()
        };
        for joined in futures::future::join_all(handles).await {
            if let Err(e) = joined {
                error!("reader task panicked: {e}");
            }
        }
    }
}
