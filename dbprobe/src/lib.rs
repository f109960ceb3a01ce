//! # Dbprobe
//!
//! Async black-box boundary test driver for line-oriented database REPLs.
//!
//! Dbprobe spawns a REPL-style executable (a toy database command processor)
//! as a subordinate process, feeds it textual commands over stdin, and
//! inspects stdout to validate two boundary behaviors: maximum row capacity
//! and maximum per-field string length.
//!
//! ## Features
//!
//! - Async subprocess management via tokio with guaranteed cleanup
//! - Bounded chunk reads — a silent subordinate yields a `ReadStall` error
//!   instead of hanging the harness
//! - Incremental marker scanning across arbitrarily chunked output
//! - Structured probe reports carrying the raw output as evidence
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dbprobe::{BoundaryProbe, ProcessConfig, DEFAULT_MAX_ROWS};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dbprobe::Error> {
//!     let config = ProcessConfig::new("./main");
//!
//!     let mut probe = BoundaryProbe::open(config.clone())?;
//!     let report = probe.smoke_test(0).await?;
//!     println!("{}", report.evidence);
//!     probe.close().await?;
//!
//!     let probe = BoundaryProbe::open(config)?;
//!     let report = probe.table_capacity(DEFAULT_MAX_ROWS).await?;
//!     println!("{report}");
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod error;
pub mod probe;
pub mod transport;

// Re-export main types for convenience
pub use channel::{ProcessChannel, ResponseBuffer};
pub use error::Error;
pub use probe::{
    BoundaryProbe, ProbeOutcome, ProbeReport, DEFAULT_MAX_ROWS, MAX_EMAIL_LEN, MAX_USERNAME_LEN,
    TABLE_FULL_MARKER,
};
pub use transport::{ProcessConfig, ProcessTransport};
