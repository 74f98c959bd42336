//! Serial port transport
//!
//! The SS 4.4 talks 9600 baud 8N1 over RS-232, usually through a USB
//! adapter. Status lines end in `\r\n`.

use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use serialport::{available_ports, SerialPort, SerialPortType};
use ss44_protocol::{Transport, TransportError};
use tracing::{debug, info, trace};

use crate::config::SerialConfig;
use crate::error::Result;

/// Serial port as seen by the operating system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// USB product string, for adapters that report one
    pub product: Option<String>,
}

/// Enumerate serial ports available on this machine
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = available_ports()?
        .into_iter()
        .map(|p| PortInfo {
            product: match p.port_type {
                SerialPortType::UsbPort(usb) => usb.product,
                _ => None,
            },
            port: p.port_name,
        })
        .collect::<Vec<_>>();

    debug!("Found {} serial port(s)", ports.len());
    Ok(ports)
}

/// Line-oriented transport over a serial port
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    rx_buffer: Vec<u8>,
}

impl SerialTransport {
    /// Open the port described by `config`
    pub fn open(config: &SerialConfig) -> Result<Self> {
        let port = serialport::new(&config.port, config.baud_rate)
            .timeout(config.read_timeout)
            .open()?;
        info!("Opened {} at {} baud", config.port, config.baud_rate);
        Ok(Self::from_port(port))
    }

    /// Wrap an already opened port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self {
            port,
            rx_buffer: Vec::with_capacity(64),
        }
    }
}

/// Longest unterminated input kept while waiting for `\n`
const MAX_LINE_LEN: usize = 256;

/// Remove and return the first complete line in `buffer`
///
/// Unterminated input longer than [`MAX_LINE_LEN`] is discarded and reported
/// as invalid data.
fn take_line(buffer: &mut Vec<u8>) -> std::result::Result<Option<Vec<u8>>, TransportError> {
    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        return Ok(Some(buffer.drain(..=pos).collect()));
    }
    if buffer.len() > MAX_LINE_LEN {
        let msg = format!("no line terminator in {} bytes", buffer.len());
        buffer.clear();
        return Err(io::Error::new(ErrorKind::InvalidData, msg).into());
    }
    Ok(None)
}

fn io_error(e: io::Error) -> TransportError {
    match e.kind() {
        ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof => {
            TransportError::Closed
        }
        _ => TransportError::Io(e),
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, data: &[u8]) -> std::result::Result<(), TransportError> {
        trace!("Serial write: {:?}", String::from_utf8_lossy(data));
        self.port.write_all(data).map_err(io_error)?;
        self.port.flush().map_err(io_error)?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> std::result::Result<Vec<u8>, TransportError> {
        let deadline = Instant::now() + timeout;
        let mut chunk = [0u8; 64];

        loop {
            if let Some(line) = take_line(&mut self.rx_buffer)? {
                trace!("Serial read: {:?}", String::from_utf8_lossy(&line));
                return Ok(line);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(TransportError::Timeout(timeout));
            }
            self.port
                .set_timeout(remaining)
                .map_err(|e| TransportError::Io(e.into()))?;

            match self.port.read(&mut chunk) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => self.rx_buffer.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {}
                Err(e) => return Err(io_error(e)),
            }
        }
    }
}
