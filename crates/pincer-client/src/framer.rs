//! Record framing over a growing byte buffer.
//!
//! Successive socket reads are appended to a [`RecordBuffer`]; the framer
//! detects when at least one complete protocol record has arrived, hands it
//! out, and compacts the remainder. A record ends at a doubled newline
//! (`\n\n`) or, in streaming mode, at a [`RECORD_SEPARATOR`] control byte.
//! Response headers use CRLF line endings, so the header/body boundary
//! (`\r\n\r\n`) never triggers the terminator early.

/// ASCII record separator (0x1E); marks record boundaries in streaming mode.
pub const RECORD_SEPARATOR: u8 = 0x1E;

/// A growable raw byte region with record-boundary detection.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    data: Vec<u8>,
}

impl RecordBuffer {
    /// An empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of used bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no bytes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current backing capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// The buffered bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Grows the backing storage to at least `total` bytes of capacity.
    /// No-op when already sufficient; existing bytes are preserved.
    pub fn reserve_total(&mut self, total: usize) {
        if total > self.data.capacity() {
            self.data.reserve(total - self.data.len());
        }
    }

    /// Replaces the buffer contents, retaining spare capacity for the reads
    /// that follow. Used when beginning a fresh request/response cycle.
    pub fn reset(&mut self, content: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(content);
    }

    /// Appends inbound bytes.
    pub fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// True iff at least one complete record is buffered: either the
    /// two-byte `\n\n` sequence or a record-separator byte is present.
    ///
    /// May under-report while a record is still arriving; callers re-check
    /// after each additional read.
    #[must_use]
    pub fn has_complete_record(&self) -> bool {
        if self.data.len() < 2 {
            return false;
        }

        self.data.windows(2).any(|pair| pair == b"\n\n")
            || self.data.contains(&RECORD_SEPARATOR)
    }

    /// The bytes from the start of the buffer up to (excluding) the first
    /// terminator, skipping one leading separator byte if present. With no
    /// terminator buffered, everything is returned.
    #[must_use]
    pub fn extract_record(&self) -> &[u8] {
        let start = usize::from(self.data.first() == Some(&RECORD_SEPARATOR));
        let rest = &self.data[start..];

        let separator = rest.iter().position(|&byte| byte == RECORD_SEPARATOR);
        let blank_line = find_subsequence(rest, b"\n\n");

        let end = match (separator, blank_line) {
            (Some(a), Some(b)) => a.min(b),
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (None, None) => rest.len(),
        };

        &rest[..end]
    }

    /// Drops the first record: advances past the first `\n\n` (and past an
    /// immediately following separator byte) and shifts the remaining bytes
    /// to the front.
    ///
    /// Returns false, leaving the buffer untouched, when no terminator is
    /// present.
    pub fn consume_record(&mut self) -> bool {
        let Some(terminator) = find_subsequence(&self.data, b"\n\n") else {
            return false;
        };

        let mut next = terminator + 2;
        if self.data.get(next) == Some(&RECORD_SEPARATOR) {
            next += 1;
        }

        self.data.drain(..next);
        true
    }
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
