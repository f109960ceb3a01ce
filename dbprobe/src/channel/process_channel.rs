//! Line-protocol channel over a subordinate process.

use std::process::ExitStatus;

use log::trace;
use tokio::time::Instant;

use super::buffer::ResponseBuffer;
use crate::error::{ChannelError, Error, Result, TransportError};
use crate::transport::{ProcessConfig, ProcessTransport};

/// A send/receive line protocol bound to one subordinate process.
///
/// Exactly one subordinate exists per channel, and the channel exclusively
/// owns its stream handles. All operations are strictly sequential.
pub struct ProcessChannel {
    /// The underlying subprocess transport.
    transport: ProcessTransport,

    /// Scratch accumulator for framed reads.
    scratch: ResponseBuffer,
}

impl ProcessChannel {
    /// Spawn the subordinate and open a channel to it.
    pub fn open(config: ProcessConfig) -> Result<Self> {
        Ok(Self {
            transport: ProcessTransport::spawn(config)?,
            scratch: ResponseBuffer::new(),
        })
    }

    /// Send one command line, newline-terminated, flushed.
    pub async fn send(&mut self, line: &str) -> Result<()> {
        self.transport.send(line).await
    }

    /// Send one command line with an explicit terminator.
    pub async fn send_with_terminator(&mut self, line: &str, terminator: &str) -> Result<()> {
        self.transport.send_with_terminator(line, terminator).await
    }

    /// Receive whatever output is currently available, as text.
    ///
    /// Performs exactly one bounded read. The returned text is not
    /// guaranteed to be a complete logical response; callers that need a
    /// specific fragment accumulate across calls or use
    /// [`read_until_marker`](Self::read_until_marker).
    ///
    /// # Errors
    ///
    /// [`TransportError::ReadStall`] if the subordinate produces nothing
    /// within the configured read timeout.
    pub async fn receive(&mut self) -> Result<String> {
        let timeout = self.transport.config().read_timeout;
        let deadline = Instant::now() + timeout;
        let chunk = self.transport.read_chunk(deadline, timeout).await?;
        Ok(String::from_utf8_lossy(&chunk).into_owned())
    }

    /// Read and accumulate output until `marker` appears, then return the
    /// whole accumulation.
    ///
    /// The read timeout covers the entire accumulation, not each chunk.
    ///
    /// # Errors
    ///
    /// - [`ChannelError::MarkerTimeout`] if the marker never appears
    /// - [`ChannelError::ClosedBeforeMarker`] if the subordinate exits first
    pub async fn read_until_marker(&mut self, marker: &str) -> Result<String> {
        let timeout = self.transport.config().read_timeout;
        let deadline = Instant::now() + timeout;
        self.scratch.clear();

        loop {
            let chunk = match self.transport.read_chunk(deadline, timeout).await {
                Ok(chunk) => chunk,
                Err(Error::Transport(TransportError::ReadStall(_))) => {
                    return Err(ChannelError::MarkerTimeout {
                        marker: marker.to_owned(),
                        timeout,
                    }
                    .into());
                }
                Err(Error::Transport(TransportError::Closed)) => {
                    return Err(ChannelError::ClosedBeforeMarker {
                        marker: marker.to_owned(),
                    }
                    .into());
                }
                Err(e) => return Err(e),
            };

            self.scratch.extend(&chunk);
            if self.scratch.scan_for(marker) {
                trace!("marker {marker:?} found after {} bytes", self.scratch.len());
                return Ok(self.scratch.take_string());
            }
        }
    }

    /// Check whether the subordinate is still running.
    pub fn is_alive(&mut self) -> bool {
        self.transport.is_alive()
    }

    /// Get the configuration for this session.
    pub fn config(&self) -> &ProcessConfig {
        self.transport.config()
    }

    /// Close the channel: deliver the exit command and reap the
    /// subordinate, force-killing it if it ignores the command.
    pub async fn close(self, exit_command: &str) -> Result<ExitStatus> {
        self.transport.shutdown(exit_command).await
    }
}
