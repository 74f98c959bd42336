//! Verified switching over a [`Transport`]
//!
//! Every mutating command makes the switcher print a four-line status
//! report. The controller always consumes that report before sending
//! anything else; a second command sent early shifts the line framing and
//! every later parse reads the wrong rows.

use ss44_protocol::{
    Command, CrosspointMatrix, EncodeCommand, Input, Output, StatusBlock, Transport, Unit,
    STATUS_LINES,
};
use tracing::{debug, info, trace, warn};

use crate::config::ControllerConfig;
use crate::error::{ProtocolMismatch, Result};
use crate::outcome::{StaleMute, SwitchOutcome};

/// Lines `resynchronize` will discard before giving up on a quiet boundary
const MAX_RESYNC_LINES: usize = 64;

/// Drives one switcher unit over an exclusively owned transport
pub struct SwitchController<T> {
    transport: T,
    config: ControllerConfig,
}

impl<T: Transport> SwitchController<T> {
    /// Create a controller that takes ownership of `transport`
    pub fn new(transport: T, config: ControllerConfig) -> Self {
        Self { transport, config }
    }

    /// Bus address of the controlled switcher
    pub fn unit(&self) -> Unit {
        self.config.unit
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Release the transport
    pub fn into_inner(self) -> T {
        self.transport
    }

    fn send(&mut self, cmd: Command) -> Result<()> {
        debug!("Sending {}", cmd);
        self.transport.write(&cmd.encode())?;
        Ok(())
    }

    /// Block for one complete status report and decode it
    fn read_status(&mut self) -> Result<CrosspointMatrix> {
        let mut lines = Vec::with_capacity(STATUS_LINES);
        while lines.len() < STATUS_LINES {
            match self.transport.read_line(self.config.read_timeout) {
                Ok(bytes) => {
                    let line = String::from_utf8_lossy(&bytes).into_owned();
                    trace!("Status line {}: {:?}", lines.len() + 1, line);
                    lines.push(line);
                }
                Err(e) if e.is_timeout() => {
                    warn!(
                        "Status report cut short after {} of {} lines",
                        lines.len(),
                        STATUS_LINES
                    );
                    return Err(ProtocolMismatch::IncompleteStatus {
                        received: lines.len(),
                    }
                    .into());
                }
                Err(e) => return Err(e.into()),
            }
        }

        let block = StatusBlock::parse(&lines).map_err(ProtocolMismatch::MalformedStatus)?;
        Ok(block.matrix())
    }

    /// Ask the switcher for its current state
    pub fn request_full_state(&mut self) -> Result<CrosspointMatrix> {
        self.send(Command::RequestStatus { unit: self.unit() })?;
        self.read_status()
    }

    /// Mute every crosspoint
    ///
    /// Any acknowledgment the switcher prints is left unread; call
    /// [`resynchronize`](Self::resynchronize) before the next command.
    pub fn mute_all_outputs(&mut self) -> Result<()> {
        self.send(Command::MuteAll { unit: self.unit() })
    }

    /// Route `input` to `output` and return the switcher's reported state
    ///
    /// Other inputs already on `output` stay connected.
    pub fn connect(&mut self, input: Input, output: Output) -> Result<CrosspointMatrix> {
        self.send(Command::Connect {
            unit: self.unit(),
            input,
            output,
        })?;
        self.read_status()
    }

    /// Disconnect `input` from `output` and return the reported state
    pub fn mute(&mut self, input: Input, output: Output) -> Result<CrosspointMatrix> {
        self.send(Command::Mute {
            unit: self.unit(),
            input,
            output,
        })?;
        self.read_status()
    }

    /// Make `input` the only source on `output`
    ///
    /// Connects first, then mutes every other input the status report still
    /// shows on that output. If the connect itself did not take, nothing is
    /// muted. A mute that does not take is recorded and the remaining stale
    /// inputs are still processed. Transport and framing errors abort the
    /// whole operation.
    pub fn connect_and_settle(&mut self, input: Input, output: Output) -> Result<SwitchOutcome> {
        let primary = self.connect(input, output)?;

        if !primary.is_connected(input, output) {
            warn!("Input {} did not connect to output {}", input, output);
            return Ok(SwitchOutcome {
                input,
                output,
                connected: false,
                stale: Vec::new(),
                final_state: primary,
            });
        }

        let stale_inputs: Vec<Input> = primary
            .inputs_on(output)
            .into_iter()
            .filter(|&i| i != input)
            .collect();

        let mut final_state = primary;
        let mut stale = Vec::with_capacity(stale_inputs.len());
        for stale_input in stale_inputs {
            debug!("Muting stale input {} on output {}", stale_input, output);
            final_state = self.mute(stale_input, output)?;

            let muted = !final_state.is_connected(stale_input, output);
            if !muted {
                warn!("Input {} did not mute on output {}", stale_input, output);
            }
            stale.push(StaleMute {
                input: stale_input,
                muted,
            });
        }

        info!("Switched input {} to output {}", input, output);
        Ok(SwitchOutcome {
            input,
            output,
            connected: true,
            stale,
            final_state,
        })
    }

    /// [`connect_and_settle`](Self::connect_and_settle) with front-panel numbering
    pub fn switch_output(&mut self, input: u8, output: u8) -> Result<SwitchOutcome> {
        let input = Input::new(input)?;
        let output = Output::new(output)?;
        self.connect_and_settle(input, output)
    }

    /// Discard incoming lines until a read times out
    ///
    /// Returns the number of lines thrown away. Use after
    /// [`mute_all_outputs`](Self::mute_all_outputs) or a
    /// [`ProtocolMismatch`] to start the next report on a clean boundary.
    pub fn resynchronize(&mut self) -> Result<usize> {
        let mut discarded = 0;
        while discarded < MAX_RESYNC_LINES {
            match self.transport.read_line(self.config.read_timeout) {
                Ok(line) => {
                    trace!("Discarding {:?}", String::from_utf8_lossy(&line));
                    discarded += 1;
                }
                Err(e) if e.is_timeout() => {
                    debug!("Resynchronized after discarding {} lines", discarded);
                    return Ok(discarded);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(ProtocolMismatch::Unsettled { discarded }.into())
    }
}
