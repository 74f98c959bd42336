//! Error types for switch control

use ss44_protocol::{ParseError, TransportError, ValidationError};
use thiserror::Error;

/// The byte stream no longer lines up with status report boundaries
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolMismatch {
    /// The read timed out partway through a status report
    #[error("incomplete status report: {received} of 4 lines before timeout")]
    IncompleteStatus { received: usize },

    /// A status line could not be framed
    #[error("malformed status report: {0}")]
    MalformedStatus(#[from] ParseError),

    /// The switcher kept talking while we tried to drain it
    #[error("stream did not go quiet after discarding {discarded} lines")]
    Unsettled { discarded: usize },
}

/// Errors that can occur while controlling a switcher
#[derive(Debug, Error)]
pub enum ControlError {
    /// Link failure; the operation was abandoned
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Crosspoint index rejected before anything was sent
    #[error("invalid crosspoint: {0}")]
    Validation(#[from] ValidationError),

    /// Status framing lost; call `resynchronize` before the next command
    #[error("protocol mismatch: {0}")]
    ProtocolMismatch(#[from] ProtocolMismatch),

    /// Serial port could not be opened or configured
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl ControlError {
    /// Returns true if the stream must be resynchronized before reuse
    pub fn needs_resync(&self) -> bool {
        matches!(self, ControlError::ProtocolMismatch(_))
    }
}

pub type Result<T> = std::result::Result<T, ControlError>;
