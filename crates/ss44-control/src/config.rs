//! Controller and serial link configuration

use std::time::Duration;

use ss44_protocol::Unit;

/// Default per-line read timeout, matching the switcher's reply latency
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Default RS-232 speed of the SS 4.4
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Settings for one [`SwitchController`](crate::SwitchController)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Bus address of the switcher being driven
    pub unit: Unit,
    /// How long to wait for each status line
    pub read_timeout: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            unit: Unit(0),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Serial port parameters (8N1, no flow control)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Port path (e.g., /dev/ttyUSB0, COM3)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Initial port read timeout
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}
