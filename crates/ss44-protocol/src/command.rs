//! Switcher commands and their wire encoding
//!
//! Every command is ASCII text starting with `*` followed by the decimal
//! unit number. The encoder never appends a terminator; the SS 4.4 acts on
//! the command as soon as the final character arrives.
//!
//! # Format
//! - `*<unit>MA` - mute all outputs
//! - `*<unit><II>M<O>` - mute input `II` (two digits) on output `O`
//! - `*<unit><II><O>` - connect input `II` (two digits) to output `O`
//! - `*<unit>SL` - request the four-line status report

use std::fmt;

use crate::error::{ParseError, ValidationError};
use crate::{EncodeCommand, NUM_INPUTS, NUM_OUTPUTS};

/// Address of one switcher on a shared serial bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Unit(pub u8);

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audio source, numbered 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Input(u8);

impl Input {
    /// Create an input index, rejecting anything outside 1..=4
    pub fn new(n: u8) -> Result<Self, ValidationError> {
        if (1..=NUM_INPUTS as u8).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ValidationError::InputOutOfRange(n))
        }
    }

    /// All inputs in ascending order
    pub fn all() -> impl Iterator<Item = Input> {
        (1..=NUM_INPUTS as u8).map(Input)
    }

    /// The 1-based index as seen on the front panel
    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position for array storage
    pub(crate) fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Input {
    type Error = ValidationError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Input::new(n)
    }
}

impl From<Input> for u8 {
    fn from(input: Input) -> u8 {
        input.0
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Audio destination, numbered 1 through 4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Output(u8);

impl Output {
    /// Create an output index, rejecting anything outside 1..=4
    pub fn new(n: u8) -> Result<Self, ValidationError> {
        if (1..=NUM_OUTPUTS as u8).contains(&n) {
            Ok(Self(n))
        } else {
            Err(ValidationError::OutputOutOfRange(n))
        }
    }

    /// All outputs in ascending order
    pub fn all() -> impl Iterator<Item = Output> {
        (1..=NUM_OUTPUTS as u8).map(Output)
    }

    /// The 1-based index as seen on the front panel
    pub fn get(self) -> u8 {
        self.0
    }

    pub(crate) fn slot(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Output {
    type Error = ValidationError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Output::new(n)
    }
}

impl From<Output> for u8 {
    fn from(output: Output) -> u8 {
        output.0
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command addressed to one switcher unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Command {
    /// Mute every crosspoint: `*0MA`
    MuteAll { unit: Unit },
    /// Disconnect one input from one output: `*001M2`
    Mute {
        unit: Unit,
        input: Input,
        output: Output,
    },
    /// Route one input to one output: `*0012`
    Connect {
        unit: Unit,
        input: Input,
        output: Output,
    },
    /// Ask for the status report: `*0SL`
    RequestStatus { unit: Unit },
}

impl Command {
    /// The unit this command is addressed to
    pub fn unit(&self) -> Unit {
        match self {
            Command::MuteAll { unit }
            | Command::Mute { unit, .. }
            | Command::Connect { unit, .. }
            | Command::RequestStatus { unit } => *unit,
        }
    }

    /// Returns whether the switcher changes state on this command
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::RequestStatus { .. })
    }

    /// Parse command text as sent to the switcher
    ///
    /// The unit number has no fixed width, so the command is decoded from
    /// the tail: `MA` and `SL` are fixed suffixes, otherwise the last digit
    /// is the output, optionally preceded by `M`, and the two digits before
    /// that are the input.
    pub fn parse(text: &str) -> Result<Command, ParseError> {
        let invalid = || ParseError::InvalidCommand(text.to_string());

        let body = text.trim_end().strip_prefix('*').ok_or_else(invalid)?;
        if !body.is_ascii() {
            return Err(invalid());
        }

        if let Some(unit) = body.strip_suffix("MA") {
            return Ok(Command::MuteAll {
                unit: parse_unit(unit).ok_or_else(invalid)?,
            });
        }
        if let Some(unit) = body.strip_suffix("SL") {
            return Ok(Command::RequestStatus {
                unit: parse_unit(unit).ok_or_else(invalid)?,
            });
        }

        let (head, output) = body.split_at(body.len().checked_sub(1).ok_or_else(invalid)?);
        let output = Output::new(parse_digits(output).ok_or_else(invalid)?)?;

        let (head, mute) = match head.strip_suffix('M') {
            Some(rest) => (rest, true),
            None => (head, false),
        };
        let (unit, input) = head.split_at(head.len().checked_sub(2).ok_or_else(invalid)?);
        let input = Input::new(parse_digits(input).ok_or_else(invalid)?)?;
        let unit = parse_unit(unit).ok_or_else(invalid)?;

        Ok(if mute {
            Command::Mute {
                unit,
                input,
                output,
            }
        } else {
            Command::Connect {
                unit,
                input,
                output,
            }
        })
    }
}

fn parse_digits(s: &str) -> Option<u8> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_unit(s: &str) -> Option<Unit> {
    parse_digits(s).map(Unit)
}

impl EncodeCommand for Command {
    fn encode(&self) -> Vec<u8> {
        let cmd = match self {
            Command::MuteAll { unit } => format!("*{}MA", unit),
            Command::Mute {
                unit,
                input,
                output,
            } => format!("*{}{:02}M{}", unit, input.get(), output),
            Command::Connect {
                unit,
                input,
                output,
            } => format!("*{}{:02}{}", unit, input.get(), output),
            Command::RequestStatus { unit } => format!("*{}SL", unit),
        };
        cmd.into_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.encode()))
    }
}
