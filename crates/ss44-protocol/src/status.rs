//! Status report parsing
//!
//! After every state change, and on `SL`, the SS 4.4 prints one line per
//! output:
//!
//! ```text
//! S0L1,0,1,0,0
//! S0L2,0,0,0,1
//! S0L3,0,0,0,1
//! S0L4,0,0,0,1
//! ```
//!
//! `S` marks status, `0` is the unit number and `L1`..`L4` name the output.
//! The four flags that follow are inputs 1..4. Rows are assigned by arrival
//! order; the `L<n>` label is informational only.

use tracing::warn;

use crate::command::Unit;
use crate::error::ParseError;
use crate::matrix::CrosspointMatrix;
use crate::{NUM_INPUTS, NUM_OUTPUTS};

/// Lines in one status report
pub const STATUS_LINES: usize = NUM_OUTPUTS;

/// Comma-separated fields in a well-formed status line
pub const STATUS_FIELDS: usize = NUM_INPUTS + 1;

/// One decoded status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    label: String,
    flags: [bool; NUM_INPUTS],
    fields: usize,
}

impl StatusLine {
    /// Decode a line, treating missing flags as muted
    pub fn parse(line: &str) -> Self {
        let mut parts = line.trim().split(',');
        let label = parts.next().unwrap_or_default().to_string();

        let mut flags = [false; NUM_INPUTS];
        let mut fields = 1;
        for (flag, field) in flags.iter_mut().zip(parts.by_ref()) {
            *flag = field == "1";
            fields += 1;
        }
        fields += parts.count();

        Self {
            label,
            flags,
            fields,
        }
    }

    /// Decode a line, rejecting it if any flag field is missing
    pub fn parse_strict(line: &str) -> Result<Self, ParseError> {
        let parsed = Self::parse(line);
        if parsed.fields < STATUS_FIELDS {
            return Err(ParseError::MalformedStatusLine {
                line: line.trim().to_string(),
                fields: parsed.fields,
            });
        }
        Ok(parsed)
    }

    /// The leading field, e.g. `S0L1`
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Output number named by the label, if it has one
    pub fn labelled_output(&self) -> Option<u8> {
        let (_, n) = self.label.rsplit_once('L')?;
        n.parse().ok()
    }

    /// Flags for inputs 1..=4
    pub fn flags(&self) -> [bool; NUM_INPUTS] {
        self.flags
    }
}

/// Build a matrix from four status lines by position
///
/// Line `k` becomes output `k`. Short lines leave the missing inputs muted.
pub fn parse_status<S: AsRef<str>>(lines: &[S; STATUS_LINES]) -> CrosspointMatrix {
    let mut rows = [[false; NUM_INPUTS]; NUM_OUTPUTS];
    for (row, line) in rows.iter_mut().zip(lines) {
        *row = StatusLine::parse(line.as_ref()).flags();
    }
    CrosspointMatrix::from_rows(rows)
}

/// A complete, well-framed status report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBlock {
    lines: Vec<StatusLine>,
}

impl StatusBlock {
    /// Parse exactly four lines, each with at least five fields
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        if lines.len() != STATUS_LINES {
            return Err(ParseError::WrongLineCount(lines.len()));
        }

        let lines = lines
            .iter()
            .map(|l| StatusLine::parse_strict(l.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        for (row, line) in lines.iter().enumerate() {
            match line.labelled_output() {
                Some(n) if usize::from(n) == row + 1 => {}
                _ => warn!(
                    "Status line {} labelled {:?}; using arrival order",
                    row + 1,
                    line.label()
                ),
            }
        }

        Ok(Self { lines })
    }

    /// The raw decoded lines
    pub fn lines(&self) -> &[StatusLine] {
        &self.lines
    }

    /// Crosspoint state described by this report
    pub fn matrix(&self) -> CrosspointMatrix {
        let mut rows = [[false; NUM_INPUTS]; NUM_OUTPUTS];
        for (row, line) in rows.iter_mut().zip(&self.lines) {
            *row = line.flags();
        }
        CrosspointMatrix::from_rows(rows)
    }

    /// Render the report the switcher would print for `matrix`
    pub fn encode(unit: Unit, matrix: &CrosspointMatrix) -> Vec<u8> {
        let mut out = String::with_capacity(STATUS_LINES * 16);
        for (n, output) in crate::Output::all().enumerate() {
            out.push_str(&format!("S{}L{}", unit, n + 1));
            for connected in matrix.row(output) {
                out.push_str(if connected { ",1" } else { ",0" });
            }
            out.push_str("\r\n");
        }
        out.into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Input, Output};

    const SAMPLE: [&str; 4] = [
        "S0L1,0,1,0,0\r\n",
        "S0L2,0,0,0,1\r\n",
        "S0L3,0,0,0,1\r\n",
        "S0L4,0,0,0,1\r\n",
    ];

    #[test]
    fn test_parse_sample_report() {
        let m = parse_status(&SAMPLE);
        assert_eq!(m.to_bit_string(), "0100000100010001");
    }

    #[test]
    fn test_rows_follow_arrival_order() {
        let lines = [
            "S0L9,0,1,0,0",
            "S0L1,0,0,0,0",
            "S0L1,0,0,0,0",
            "S0L1,0,0,0,0",
        ];
        let m = parse_status(&lines);
        assert_eq!(m.row(Output::new(1).unwrap()), [false, true, false, false]);

        let block = StatusBlock::parse(&lines).unwrap();
        assert_eq!(block.matrix(), m);
    }

    #[test]
    fn test_multiple_inputs_preserved() {
        let lines = [
            "S0L1,1,1,0,0",
            "S0L2,0,0,0,0",
            "S0L3,0,0,0,0",
            "S0L4,0,0,0,0",
        ];
        let m = parse_status(&lines);
        assert_eq!(m.row(Output::new(1).unwrap()), [true, true, false, false]);
    }

    #[test]
    fn test_anything_but_one_is_false() {
        let line = StatusLine::parse("S0L1,1,2,x,");
        assert_eq!(line.flags(), [true, false, false, false]);
    }

    #[test]
    fn test_short_line_defaults_to_muted() {
        let line = StatusLine::parse("S0L1,1");
        assert_eq!(line.flags(), [true, false, false, false]);
        assert!(StatusLine::parse_strict("S0L1,1").is_err());
    }

    #[test]
    fn test_strict_rejects_short_line() {
        let lines = ["S0L1,0,0,0,0", "S0L2,0,0", "S0L3,0,0,0,0", "S0L4,0,0,0,0"];
        assert_eq!(
            StatusBlock::parse(&lines),
            Err(ParseError::MalformedStatusLine {
                line: "S0L2,0,0".to_string(),
                fields: 3
            })
        );
    }

    #[test]
    fn test_strict_rejects_wrong_line_count() {
        let lines = ["S0L1,0,0,0,0", "S0L2,0,0,0,0"];
        assert_eq!(
            StatusBlock::parse(&lines),
            Err(ParseError::WrongLineCount(2))
        );
    }

    #[test]
    fn test_labelled_output() {
        assert_eq!(StatusLine::parse("S0L3,0,0,0,0").labelled_output(), Some(3));
        assert_eq!(
            StatusLine::parse("S12L4,0,0,0,0").labelled_output(),
            Some(4)
        );
        assert_eq!(StatusLine::parse("garbage").labelled_output(), None);
    }

    #[test]
    fn test_encode_matches_device_format() {
        let m = CrosspointMatrix::new()
            .with(Input::new(2).unwrap(), Output::new(1).unwrap(), true)
            .with(Input::new(4).unwrap(), Output::new(2).unwrap(), true)
            .with(Input::new(4).unwrap(), Output::new(3).unwrap(), true)
            .with(Input::new(4).unwrap(), Output::new(4).unwrap(), true);
        let encoded = StatusBlock::encode(Unit(0), &m);
        assert_eq!(encoded, SAMPLE.concat().into_bytes());
    }
}
