//! SS 4.4 Switch Control
//!
//! This crate drives a Broadcast Tools SS 4.4 matrix switcher and verifies
//! every change against the status report the switcher prints in reply.
//!
//! # Architecture
//!
//! [`SwitchController`] owns a [`Transport`](ss44_protocol::Transport) and
//! runs strictly one command at a time: send, then read the full four-line
//! report before anything else goes out. The compound
//! [`connect_and_settle`](SwitchController::connect_and_settle) operation
//! connects a new source and then mutes whatever was left on the output,
//! reporting per-crosspoint results in a [`SwitchOutcome`].
//!
//! Link failures and lost framing are errors ([`ControlError`]); a crosspoint
//! that simply did not change is an outcome ([`VerificationFailure`]).
//!
//! # Example
//!
//! ```rust,no_run
//! use ss44_control::{ControllerConfig, SerialConfig, SerialTransport, SwitchController};
//! use ss44_protocol::{Input, Output};
//!
//! let transport = SerialTransport::open(&SerialConfig::default()).unwrap();
//! let mut controller = SwitchController::new(transport, ControllerConfig::default());
//!
//! let outcome = controller
//!     .connect_and_settle(Input::new(2).unwrap(), Output::new(1).unwrap())
//!     .unwrap();
//! for failure in outcome.failures() {
//!     eprintln!("{failure}");
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod outcome;
pub mod serial;

pub use config::{ControllerConfig, SerialConfig};
pub use controller::SwitchController;
pub use error::{ControlError, ProtocolMismatch, Result};
pub use outcome::{StaleMute, SwitchOutcome, VerificationFailure};
pub use serial::{list_ports, PortInfo, SerialTransport};
