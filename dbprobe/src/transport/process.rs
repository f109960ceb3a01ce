//! Subprocess transport implementation using tokio::process.

use std::io;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use log::{debug, trace, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::time::{self, Instant};

use super::config::ProcessConfig;
use crate::error::{Result, TransportError};

/// Read buffer size for one chunk.
const CHUNK_SIZE: usize = 8192;

/// Transport owning a spawned subordinate process and its three streams.
///
/// The subordinate is spawned with `kill_on_drop`, so it is terminated on
/// every exit path even when [`shutdown`](Self::shutdown) is never reached.
#[derive(Debug)]
pub struct ProcessTransport {
    /// The subordinate process handle.
    child: Child,

    /// The subordinate's stdin (commands are written here).
    stdin: ChildStdin,

    /// The subordinate's stdout (responses are read here).
    stdout: ChildStdout,

    /// The subordinate's stderr, drained for diagnostics at shutdown.
    stderr: Option<ChildStderr>,

    /// Configuration used for this session.
    config: ProcessConfig,
}

impl ProcessTransport {
    /// Spawn the subordinate process with all three streams piped.
    pub fn spawn(config: ProcessConfig) -> Result<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| TransportError::Spawn {
                program: config.program.display().to_string(),
                source,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Io(io::Error::other("stdin handle missing")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Io(io::Error::other("stdout handle missing")))?;
        let stderr = child.stderr.take();

        debug!(
            "spawned {} (pid {:?})",
            config.program.display(),
            child.id()
        );

        Ok(Self {
            child,
            stdin,
            stdout,
            stderr,
            config,
        })
    }

    /// Send a line to the subordinate, newline-terminated.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.send_with_terminator(line, "\n").await
    }

    /// Send a line with an explicit terminator and flush so the
    /// subordinate observes it promptly.
    pub async fn send_with_terminator(&mut self, line: &str, terminator: &str) -> Result<()> {
        trace!("send: {line:?}");
        self.stdin
            .write_all(line.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        self.stdin
            .write_all(terminator.as_bytes())
            .await
            .map_err(TransportError::Write)?;
        self.stdin.flush().await.map_err(TransportError::Write)?;
        Ok(())
    }

    /// Perform one bounded read of whatever bytes are currently available.
    ///
    /// Returns at most [`CHUNK_SIZE`] bytes. There is no guarantee the
    /// returned bytes form a complete logical response; callers accumulate
    /// across calls when they need more.
    ///
    /// # Errors
    ///
    /// - [`TransportError::ReadStall`] if no output arrives before `deadline`
    /// - [`TransportError::Closed`] if the subordinate closed its stdout
    pub async fn read_chunk(&mut self, deadline: Instant, timeout: Duration) -> Result<Vec<u8>> {
        let mut buf = [0u8; CHUNK_SIZE];
        match time::timeout_at(deadline, self.stdout.read(&mut buf)).await {
            Err(_) => Err(TransportError::ReadStall(timeout).into()),
            Ok(Ok(0)) => Err(TransportError::Closed.into()),
            Ok(Ok(n)) => {
                trace!("read chunk: {n} bytes");
                Ok(buf[..n].to_vec())
            }
            Ok(Err(e)) => Err(TransportError::Io(e).into()),
        }
    }

    /// Check whether the subordinate is still running.
    pub fn is_alive(&mut self) -> bool {
        self.child.try_wait().map(|s| s.is_none()).unwrap_or(false)
    }

    /// Get the configuration for this session.
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Shut the subordinate down: best-effort delivery of the exit command,
    /// a bounded wait, and a force kill if the process ignores it.
    pub async fn shutdown(mut self, exit_command: &str) -> Result<ExitStatus> {
        debug!("shutting down subordinate with {exit_command:?}");

        // The pipe may already be broken if the subordinate exited on its
        // own; that is not a shutdown failure.
        if let Err(e) = self.send(exit_command).await {
            debug!("exit command not delivered: {e}");
        }

        let status = match time::timeout(self.config.exit_timeout, self.child.wait()).await {
            Ok(status) => status.map_err(TransportError::Io)?,
            Err(_) => {
                warn!(
                    "subordinate ignored {exit_command:?}, killing after {:?}",
                    self.config.exit_timeout
                );
                self.child.kill().await.map_err(TransportError::Io)?;
                self.child.wait().await.map_err(TransportError::Io)?
            }
        };

        self.drain_stderr().await;
        debug!("subordinate exited: {status}");
        Ok(status)
    }

    /// Best-effort read of any remaining stderr output, for diagnostics.
    async fn drain_stderr(&mut self) {
        let Some(mut stderr) = self.stderr.take() else {
            return;
        };
        let mut buf = Vec::new();
        match time::timeout(Duration::from_millis(200), stderr.read_to_end(&mut buf)).await {
            Ok(Ok(n)) if n > 0 => debug!(
                "subordinate stderr: {}",
                String::from_utf8_lossy(&buf).trim_end()
            ),
            _ => {}
        }
    }
}
