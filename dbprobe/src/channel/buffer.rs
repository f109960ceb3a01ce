//! Response buffer with incremental marker scanning.
//!
//! One read from the subordinate is not guaranteed to return a complete
//! logical response, so callers accumulate chunks here. The incremental
//! scan only searches bytes appended since the previous scan (plus a
//! `marker.len() - 1` byte overlap so a marker split across two chunks is
//! still found), rather than rescanning the whole accumulation every time.

use bytes::BytesMut;
use memchr::memmem;
use regex::bytes::Regex;

/// Buffer for accumulating subordinate output and searching it for markers.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    /// The accumulated output.
    buffer: BytesMut,

    /// Number of bytes already covered by incremental scans.
    scanned: usize,
}

impl ResponseBuffer {
    /// Create an empty response buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
            scanned: 0,
        }
    }

    /// Append raw bytes read from the subordinate.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Incrementally scan for a marker substring.
    ///
    /// Only the bytes appended since the last scan are searched, overlapping
    /// the previous region by `marker.len() - 1` bytes to catch a marker
    /// split across two chunks. All bytes are marked scanned afterwards, so
    /// a marker that was already reported is not reported again.
    pub fn scan_for(&mut self, marker: &str) -> bool {
        let overlap = marker.len().saturating_sub(1);
        let start = self.scanned.saturating_sub(overlap);
        let found = memmem::find(&self.buffer[start..], marker.as_bytes()).is_some();
        self.scanned = self.buffer.len();
        found
    }

    /// Full substring search over the entire accumulation.
    pub fn contains(&self, marker: &str) -> bool {
        memmem::find(&self.buffer, marker.as_bytes()).is_some()
    }

    /// Full regex search over the entire accumulation.
    pub fn search_full(&self, pattern: &Regex) -> Option<regex::bytes::Match<'_>> {
        pattern.find(&self.buffer)
    }

    /// Get the accumulation as text (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.buffer)
    }

    /// Take the accumulation as an owned string and reset the buffer.
    pub fn take_string(&mut self) -> String {
        let bytes = self.buffer.split();
        self.scanned = 0;
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Get the current accumulation length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the accumulation is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the accumulation and the scan position.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.scanned = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_extend() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"Executed.");
        assert_eq!(buffer.as_str_lossy(), "Executed.");
        assert_eq!(buffer.len(), 9);
    }

    #[test]
    fn test_scan_finds_marker_in_increment() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"Executed.\n");
        assert!(!buffer.scan_for("Table full"));
        buffer.extend(b"Error: Table full.\n");
        assert!(buffer.scan_for("Table full"));
    }

    #[test]
    fn test_scan_finds_marker_split_across_chunks() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"Error: Table f");
        assert!(!buffer.scan_for("Table full"));
        buffer.extend(b"ull.\n");
        assert!(buffer.scan_for("Table full"));
    }

    #[test]
    fn test_scan_does_not_rescan_old_bytes() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"Error: Table full.\n");
        assert!(buffer.scan_for("Table full"));
        buffer.extend(b"Executed.\n");
        assert!(!buffer.scan_for("Table full"));
        // The full search still sees the old marker.
        assert!(buffer.contains("Table full"));
    }

    #[test]
    fn test_search_full_regex() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"(1, aaaa, bbbb)");
        let pattern = Regex::new("a{4}").unwrap();
        assert!(buffer.search_full(&pattern).is_some());
        let pattern = Regex::new("a{5}").unwrap();
        assert!(buffer.search_full(&pattern).is_none());
    }

    #[test]
    fn test_take_resets_buffer_and_scan_position() {
        let mut buffer = ResponseBuffer::new();
        buffer.extend(b"db > Executed.");
        assert_eq!(buffer.take_string(), "db > Executed.");
        assert!(buffer.is_empty());
        buffer.extend(b"Table full");
        assert!(buffer.scan_for("Table full"));
    }
}
