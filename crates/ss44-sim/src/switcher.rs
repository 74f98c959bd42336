//! Virtual switcher simulation
//!
//! Provides a simulated SS 4.4 that acts on wire commands and produces the
//! same four-line status reports as the hardware.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use ss44_protocol::{Command, CrosspointMatrix, Input, Output, StatusBlock, Unit};
use tracing::{debug, warn};

/// Configuration for creating a virtual switcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VirtualSwitcherConfig {
    /// Bus address the switcher answers to
    pub unit: Unit,
    /// Crosspoint state at power-up
    pub initial_state: CrosspointMatrix,
    /// Whether mute-all is acknowledged with a status report
    pub status_on_mute_all: bool,
}

impl Default for VirtualSwitcherConfig {
    fn default() -> Self {
        Self {
            unit: Unit(0),
            initial_state: CrosspointMatrix::new(),
            status_on_mute_all: true,
        }
    }
}

/// A simulated SS 4.4 matrix switcher
///
/// Connect commands add a source to an output without removing the previous
/// one, as the hardware does; muting the old source is the controller's job.
#[derive(Debug)]
pub struct VirtualSwitcher {
    unit: Unit,
    state: CrosspointMatrix,
    status_on_mute_all: bool,
    /// Crosspoints that ignore connect and mute commands
    stuck: HashSet<(Input, Output)>,
    /// Truncate the next status report to this many lines
    truncate_next: Option<usize>,
    /// Pending output bytes
    pending_output: VecDeque<Vec<u8>>,
    /// Commands received (for test verification)
    received_commands: Vec<Vec<u8>>,
}

impl VirtualSwitcher {
    /// Create a switcher with every crosspoint muted
    pub fn new(unit: Unit) -> Self {
        Self::from_config(VirtualSwitcherConfig {
            unit,
            ..Default::default()
        })
    }

    /// Create a virtual switcher from configuration
    pub fn from_config(config: VirtualSwitcherConfig) -> Self {
        Self {
            unit: config.unit,
            state: config.initial_state,
            status_on_mute_all: config.status_on_mute_all,
            stuck: HashSet::new(),
            truncate_next: None,
            pending_output: VecDeque::new(),
            received_commands: Vec::new(),
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Current crosspoint state
    pub fn state(&self) -> CrosspointMatrix {
        self.state
    }

    /// Overwrite the crosspoint state without producing output
    pub fn set_state(&mut self, state: CrosspointMatrix) {
        self.state = state;
    }

    /// Make a crosspoint ignore connect and mute commands
    pub fn stick(&mut self, input: Input, output: Output) {
        self.stuck.insert((input, output));
    }

    /// Release a crosspoint previously stuck with [`stick`](Self::stick)
    pub fn unstick(&mut self, input: Input, output: Output) {
        self.stuck.remove(&(input, output));
    }

    /// Emit only the first `lines` lines of the next status report
    pub fn truncate_next_status(&mut self, lines: usize) {
        self.truncate_next = Some(lines);
    }

    /// Commands received so far, including those for other units
    pub fn received_commands(&self) -> &[Vec<u8>] {
        &self.received_commands
    }

    /// Process bytes sent to the switcher
    ///
    /// Returns true if the crosspoint state changed.
    pub fn process_command(&mut self, data: &[u8]) -> bool {
        self.received_commands.push(data.to_vec());

        let text = String::from_utf8_lossy(data);
        let cmd = match Command::parse(&text) {
            Ok(cmd) => cmd,
            Err(e) => {
                warn!("Virtual switcher ignoring {:?}: {}", text, e);
                return false;
            }
        };

        if cmd.unit() != self.unit {
            debug!("Ignoring command for unit {}", cmd.unit());
            return false;
        }

        let before = self.state;
        match cmd {
            Command::Connect { input, output, .. } => self.set_crosspoint(input, output, true),
            Command::Mute { input, output, .. } => self.set_crosspoint(input, output, false),
            Command::MuteAll { .. } => {
                for output in Output::all() {
                    for input in Input::all() {
                        self.set_crosspoint(input, output, false);
                    }
                }
                if !self.status_on_mute_all {
                    return self.state != before;
                }
            }
            Command::RequestStatus { .. } => {}
        }

        self.send_status_report();
        self.state != before
    }

    fn set_crosspoint(&mut self, input: Input, output: Output, connected: bool) {
        if self.stuck.contains(&(input, output)) {
            debug!("Crosspoint {}->{} is stuck", input, output);
            return;
        }
        self.state = self.state.with(input, output, connected);
    }

    /// Queue a status report for the current state
    pub fn send_status_report(&mut self) {
        let report = StatusBlock::encode(self.unit, &self.state);
        let report = match self.truncate_next.take() {
            Some(lines) => report
                .split_inclusive(|&b| b == b'\n')
                .take(lines)
                .flatten()
                .copied()
                .collect(),
            None => report,
        };
        if !report.is_empty() {
            self.pending_output.push_back(report);
        }
    }

    /// Take the next pending output bytes
    pub fn take_output(&mut self) -> Option<Vec<u8>> {
        self.pending_output.pop_front()
    }

    /// Check if there is pending output
    pub fn has_output(&self) -> bool {
        !self.pending_output.is_empty()
    }
}
