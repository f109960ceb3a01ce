//! Boundary probes for the subordinate database REPL.
//!
//! The probe layer drives specific boundary scenarios against the
//! subordinate process and judges success or failure by inspecting the
//! returned text, reporting each verdict as a structured [`ProbeReport`].

mod boundary;
mod report;

pub use boundary::BoundaryProbe;
pub use report::{ProbeOutcome, ProbeReport};

/// Marker substring the subordinate prints when its table is full.
pub const TABLE_FULL_MARKER: &str = "Table full";

/// Maximum username length the subordinate is expected to store.
pub const MAX_USERNAME_LEN: usize = 32;

/// Maximum email length the subordinate is expected to store.
pub const MAX_EMAIL_LEN: usize = 255;

/// Theoretical row capacity of the subordinate (100 pages of 14 rows).
pub const DEFAULT_MAX_ROWS: usize = 1400;

/// Meta-command that terminates the subordinate's REPL.
pub const EXIT_COMMAND: &str = ".exit";

/// Command that dumps all stored rows.
pub const SELECT_COMMAND: &str = "select";
