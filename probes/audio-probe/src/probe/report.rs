//! Run Report
//!
//! Tallies accumulated over one probe run, printed as the final summary.

use std::fmt;

/// What one probe run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    chunks: u32,
    chunk_sizes: Vec<usize>,
    payload_bytes: usize,
    other_kinds: Vec<String>,
    invalid_messages: u32,
}

impl ProbeReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one audio chunk and return its 1-based index.
    pub fn record_chunk(&mut self, size: usize) -> u32 {
        self.chunks += 1;
        self.chunk_sizes.push(size);
        self.payload_bytes += size;
        self.chunks
    }

    /// Record a non-chunk message by its `type` string.
    pub fn record_other(&mut self, kind: &str) {
        self.other_kinds.push(kind.to_string());
    }

    /// Record a frame that could not be parsed.
    pub fn record_invalid(&mut self) {
        self.invalid_messages += 1;
    }

    pub fn chunks(&self) -> u32 {
        self.chunks
    }

    /// Chunk payload lengths in arrival order.
    pub fn chunk_sizes(&self) -> &[usize] {
        &self.chunk_sizes
    }

    pub fn payload_bytes(&self) -> usize {
        self.payload_bytes
    }

    pub fn other_messages(&self) -> u32 {
        self.other_kinds.len() as u32
    }

    pub fn invalid_messages(&self) -> u32 {
        self.invalid_messages
    }
}

impl fmt::Display for ProbeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total audio chunks received: {}", self.chunks)?;
        writeln!(f, "Total payload bytes: {}", self.payload_bytes)?;
        write!(f, "Other messages: {}", self.other_kinds.len())?;
        if !self.other_kinds.is_empty() {
            write!(f, " ({})", self.other_kinds.join(", "))?;
        }
        if self.invalid_messages > 0 {
            write!(f, "\nUnparseable messages: {}", self.invalid_messages)?;
        }
        Ok(())
    }
}
