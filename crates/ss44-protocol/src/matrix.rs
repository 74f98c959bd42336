//! Crosspoint matrix snapshot

use std::fmt;

use crate::command::{Input, Output};
use crate::{NUM_INPUTS, NUM_OUTPUTS};

/// Which inputs are routed to which outputs, as last reported by the switcher
///
/// Rows are outputs and columns are inputs. A row may have zero or several
/// inputs set; the switcher normally keeps at most one, but the matrix
/// reports exactly what the device said.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrosspointMatrix {
    rows: [[bool; NUM_INPUTS]; NUM_OUTPUTS],
}

impl CrosspointMatrix {
    /// Matrix with every crosspoint muted
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from zero-based rows, `rows[output][input]`
    pub fn from_rows(rows: [[bool; NUM_INPUTS]; NUM_OUTPUTS]) -> Self {
        Self { rows }
    }

    /// Returns whether `input` is routed to `output`
    pub fn is_connected(&self, input: Input, output: Output) -> bool {
        self.rows[output.slot()][input.slot()]
    }

    /// Flags for inputs 1..=4 on one output
    pub fn row(&self, output: Output) -> [bool; NUM_INPUTS] {
        self.rows[output.slot()]
    }

    /// Inputs currently routed to `output`, in ascending order
    pub fn inputs_on(&self, output: Output) -> Vec<Input> {
        Input::all()
            .filter(|&input| self.is_connected(input, output))
            .collect()
    }

    /// Returns a copy with one crosspoint changed
    pub fn with(mut self, input: Input, output: Output, connected: bool) -> Self {
        self.rows[output.slot()][input.slot()] = connected;
        self
    }

    /// Returns whether no crosspoint is connected
    pub fn is_all_muted(&self) -> bool {
        self.rows.iter().flatten().all(|&c| !c)
    }

    /// Sixteen `1`/`0` characters, output-major
    pub fn to_bit_string(&self) -> String {
        self.rows
            .iter()
            .flatten()
            .map(|&c| if c { '1' } else { '0' })
            .collect()
    }

    /// Multi-line grid with output rows and input columns
    pub fn to_grid(&self) -> String {
        let mut out = String::from("      IN1 IN2 IN3 IN4\n");
        for output in Output::all() {
            out.push_str(&format!("OUT{} ", output));
            for connected in self.row(output) {
                out.push_str(if connected { "   X" } else { "   ." });
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for CrosspointMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bit_string())
    }
}
