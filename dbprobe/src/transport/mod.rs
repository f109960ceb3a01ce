//! Subprocess transport layer wrapping tokio's process machinery.
//!
//! This module provides the low-level subordinate-process management,
//! handling spawn, stream I/O with deadlines, and shutdown.

pub mod config;
mod process;

pub use config::ProcessConfig;
pub use process::ProcessTransport;
