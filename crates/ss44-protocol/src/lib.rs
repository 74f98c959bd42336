//! SS 4.4 Protocol Library
//!
//! This crate provides command encoding and status parsing for the
//! Broadcast Tools SS 4.4 stereo matrix switcher, a 4 input × 4 output
//! audio router controlled over RS-232.
//!
//! # Architecture
//!
//! - [`Command`] values are built from validated [`Input`]/[`Output`]
//!   indices and rendered with [`EncodeCommand::encode`]
//! - The switcher answers every state change with a four-line status
//!   report, decoded by [`StatusBlock`] or [`parse_status`] into a
//!   [`CrosspointMatrix`]
//! - [`Transport`] is the blocking line-oriented link the controller
//!   drives; this crate only defines it
//!
//! # Example
//!
//! ```rust
//! use ss44_protocol::{Command, EncodeCommand, Input, Output, Unit, parse_status};
//!
//! let cmd = Command::Connect {
//!     unit: Unit(0),
//!     input: Input::new(2).unwrap(),
//!     output: Output::new(1).unwrap(),
//! };
//! assert_eq!(cmd.encode(), b"*0021");
//!
//! let matrix = parse_status(&[
//!     "S0L1,0,1,0,0\r\n",
//!     "S0L2,0,0,0,1\r\n",
//!     "S0L3,0,0,0,1\r\n",
//!     "S0L4,0,0,0,1\r\n",
//! ]);
//! assert!(matrix.is_connected(Input::new(2).unwrap(), Output::new(1).unwrap()));
//! ```

pub mod command;
pub mod error;
pub mod matrix;
pub mod status;
pub mod transport;

pub use command::{Command, Input, Output, Unit};
pub use error::{ParseError, TransportError, ValidationError};
pub use matrix::CrosspointMatrix;
pub use status::{parse_status, StatusBlock, StatusLine, STATUS_FIELDS, STATUS_LINES};
pub use transport::Transport;

/// Number of inputs on the switcher
pub const NUM_INPUTS: usize = 4;

/// Number of outputs on the switcher
pub const NUM_OUTPUTS: usize = 4;

/// Trait for commands that can be encoded to bytes
pub trait EncodeCommand {
    /// Encode this command to its wire format
    fn encode(&self) -> Vec<u8>;
}
