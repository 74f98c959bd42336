//! SS 4.4 Simulation Library
//!
//! This crate provides a simulation layer for testing switcher control
//! without the physical device. It includes:
//!
//! - **VirtualSwitcher**: Simulates the switcher's crosspoint state and
//!   status reports, with fault injection for stuck crosspoints and
//!   truncated reports
//! - **SimTransport**: A [`Transport`](ss44_protocol::Transport) that routes
//!   writes to a `VirtualSwitcher` and serves its output line by line
//!
//! # Example
//!
//! ```rust
//! use ss44_sim::{SimTransport, VirtualSwitcher};
//! use ss44_protocol::{Transport, Unit};
//! use std::time::Duration;
//!
//! let mut transport = SimTransport::new(VirtualSwitcher::new(Unit(0)));
//! transport.write(b"*0011").unwrap();
//!
//! let line = transport.read_line(Duration::from_secs(1)).unwrap();
//! assert_eq!(line, b"S0L1,1,0,0,0\r\n");
//! ```

pub mod switcher;
pub mod transport;

pub use switcher::{VirtualSwitcher, VirtualSwitcherConfig};
pub use transport::SimTransport;
