//! Error types for SS 4.4 protocol parsing, validation and transport

use std::time::Duration;

use thiserror::Error;

/// Rejected crosspoint index
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Input index outside the switcher's 1..=4 range
    #[error("input {0} out of range (expected 1-4)")]
    InputOutOfRange(u8),

    /// Output index outside the switcher's 1..=4 range
    #[error("output {0} out of range (expected 1-4)")]
    OutputOutOfRange(u8),
}

/// Errors that can occur while parsing protocol text
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Command text that does not follow `*<unit><cmd>`
    #[error("invalid command: {0:?}")]
    InvalidCommand(String),

    /// Command carried an index the switcher does not have
    #[error("invalid index in command: {0}")]
    InvalidIndex(#[from] ValidationError),

    /// Status line with fewer than five comma-separated fields
    #[error("malformed status line {line:?}: expected 5 fields, got {fields}")]
    MalformedStatusLine { line: String, fields: usize },

    /// Status block that is not exactly four lines
    #[error("status block has {0} lines, expected 4")]
    WrongLineCount(usize),
}

/// Failures of the byte stream underneath the protocol
#[derive(Debug, Error)]
pub enum TransportError {
    /// No complete line arrived within the read timeout
    #[error("read timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// The peer closed the stream
    #[error("stream closed")]
    Closed,

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    /// Returns true if this error is a read timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}
