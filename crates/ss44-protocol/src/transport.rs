//! Byte stream abstraction consumed by the switch controller
//!
//! The SS 4.4 protocol is strictly request/response over a serial line.
//! Implementations exist for real serial ports (`ss44-control`) and for the
//! simulated switcher (`ss44-sim`).

use std::time::Duration;

use crate::error::TransportError;

/// Blocking, line-oriented link to one switcher
pub trait Transport {
    /// Write all of `data` and flush it to the device
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Read one line, up to and including its `\n` terminator
    ///
    /// Waits at most `timeout` for the line to complete and returns
    /// [`TransportError::Timeout`] otherwise. Bytes of a partial line are
    /// kept for the next call.
    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        (**self).read_line(timeout)
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        (**self).write(data)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        (**self).read_line(timeout)
    }
}
