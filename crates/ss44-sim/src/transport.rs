//! In-memory transport wired to a [`VirtualSwitcher`]

use std::time::Duration;

use ss44_protocol::{Transport, TransportError};
use tracing::trace;

use crate::switcher::VirtualSwitcher;

/// Transport that delivers commands straight to a virtual switcher
///
/// Reads never block: if no complete line is buffered the read times out
/// immediately, which is what a real port does once the switcher has
/// finished talking.
#[derive(Debug)]
pub struct SimTransport {
    switcher: VirtualSwitcher,
    rx_buffer: Vec<u8>,
    writes: Vec<Vec<u8>>,
    lines_read: usize,
    closed: bool,
}

impl SimTransport {
    pub fn new(switcher: VirtualSwitcher) -> Self {
        Self {
            switcher,
            rx_buffer: Vec::new(),
            writes: Vec::new(),
            lines_read: 0,
            closed: false,
        }
    }

    pub fn switcher(&self) -> &VirtualSwitcher {
        &self.switcher
    }

    pub fn switcher_mut(&mut self) -> &mut VirtualSwitcher {
        &mut self.switcher
    }

    /// Every write made through this transport
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Number of complete lines handed out by `read_line`
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Bytes received from the switcher but not yet read
    pub fn unread(&self) -> &[u8] {
        &self.rx_buffer
    }

    /// Queue bytes as if the switcher had sent them unprompted
    pub fn inject(&mut self, data: &[u8]) {
        self.rx_buffer.extend_from_slice(data);
    }

    /// Simulate the cable being pulled
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn collect_output(&mut self) {
        while let Some(bytes) = self.switcher.take_output() {
            self.rx_buffer.extend_from_slice(&bytes);
        }
    }
}

impl Transport for SimTransport {
    fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.writes.push(data.to_vec());
        self.switcher.process_command(data);
        self.collect_output();
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Vec<u8>, TransportError> {
        if let Some(pos) = self.rx_buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.rx_buffer.drain(..=pos).collect();
            trace!("Sim read: {:?}", String::from_utf8_lossy(&line));
            self.lines_read += 1;
            return Ok(line);
        }
        if self.closed {
            return Err(TransportError::Closed);
        }
        Err(TransportError::Timeout(timeout))
    }
}
