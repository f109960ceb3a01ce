//! Subordinate process configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for spawning and talking to the subordinate process.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Path to the executable under test.
    pub program: PathBuf,

    /// Arguments passed to the executable.
    pub args: Vec<String>,

    /// Deadline for a single receive: how long to wait for any output
    /// before reporting a read stall.
    pub read_timeout: Duration,

    /// Grace period between sending the exit command and force-killing
    /// the subordinate.
    pub exit_timeout: Duration,
}

impl ProcessConfig {
    /// Create a configuration for the given executable with default timeouts.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Set the arguments passed to the executable.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the receive deadline.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the shutdown grace period.
    pub fn exit_timeout(mut self, timeout: Duration) -> Self {
        self.exit_timeout = timeout;
        self
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./main"),
            args: Vec::new(),
            read_timeout: Duration::from_secs(5),
            exit_timeout: Duration::from_secs(2),
        }
    }
}
