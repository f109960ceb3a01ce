//! Error types for dbprobe.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Main error type for dbprobe operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Subprocess transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Channel operation errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Transport layer errors (subprocess spawn, stream I/O).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to start the subordinate process
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Write to a closed or broken stdin pipe
    #[error("Write to subordinate stdin failed: {0}")]
    Write(#[source] io::Error),

    /// The subordinate closed its output stream (EOF)
    #[error("Subordinate process closed its output stream")]
    Closed,

    /// No output became available before the read deadline
    #[error("No output from subordinate within {0:?}")]
    ReadStall(Duration),

    /// Other stream-level I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Channel layer errors (framed reads, marker matching).
#[derive(Error, Debug)]
pub enum ChannelError {
    /// A framed read gave up before the marker appeared
    #[error("Marker {marker:?} not found within {timeout:?}")]
    MarkerTimeout { marker: String, timeout: Duration },

    /// The subordinate exited while a framed read was still waiting
    #[error("Subordinate exited before marker {marker:?} appeared")]
    ClosedBeforeMarker { marker: String },

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Result type alias using dbprobe's Error.
pub type Result<T> = std::result::Result<T, Error>;
