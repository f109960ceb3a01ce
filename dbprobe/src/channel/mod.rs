//! Channel layer for the line protocol against the subordinate process.
//!
//! This module handles response accumulation and marker-based scanning on
//! top of the raw subprocess transport.

mod buffer;
mod process_channel;

pub use buffer::ResponseBuffer;
pub use process_channel::ProcessChannel;
