//! Results of a verified switch
//!
//! The switcher never reports errors directly. A connect or mute that did
//! not take effect only shows up in the next status report, so those
//! failures are returned as data rather than as `Err`.

use ss44_protocol::{CrosspointMatrix, Input, Output};
use thiserror::Error;

/// A crosspoint the switcher did not set as asked
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VerificationFailure {
    #[error("input {input} did not connect to output {output}")]
    NotConnected { input: Input, output: Output },

    #[error("input {input} did not mute on output {output}")]
    NotMuted { input: Input, output: Output },
}

/// Result of muting one stale input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleMute {
    /// Input that was found on the output alongside the new source
    pub input: Input,
    /// Whether the following status report showed it muted
    pub muted: bool,
}

/// Aggregate result of [`connect_and_settle`](crate::SwitchController::connect_and_settle)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub input: Input,
    pub output: Output,
    /// Whether the status after the connect showed the new route
    pub connected: bool,
    /// Every stale input found, in ascending order, with its mute result
    pub stale: Vec<StaleMute>,
    /// Crosspoint state from the last status report read
    pub final_state: CrosspointMatrix,
}

impl SwitchOutcome {
    /// Returns whether the route is in place and every stale input muted
    pub fn is_success(&self) -> bool {
        self.connected && self.stale.iter().all(|s| s.muted)
    }

    /// Every crosspoint that did not end up as requested
    pub fn failures(&self) -> Vec<VerificationFailure> {
        let mut failures = Vec::new();
        if !self.connected {
            failures.push(VerificationFailure::NotConnected {
                input: self.input,
                output: self.output,
            });
        }
        failures.extend(self.stale.iter().filter(|s| !s.muted).map(|s| {
            VerificationFailure::NotMuted {
                input: s.input,
                output: self.output,
            }
        }));
        failures
    }
}
