//! Subcommand implementations

use std::thread;
use std::time::Duration;

use anyhow::{bail, Result};
use ss44_control::{SwitchController, SwitchOutcome};
use ss44_protocol::{CrosspointMatrix, Input, Output, Transport};
use tracing::info;

/// Print the switcher state as a bit string and grid
pub fn status<T: Transport>(controller: &mut SwitchController<T>) -> Result<CrosspointMatrix> {
    let state = controller.request_full_state()?;
    print_state(&state);
    Ok(state)
}

pub fn print_state(state: &CrosspointMatrix) {
    println!("{}", state);
    print!("{}", state.to_grid());
}

fn report(outcome: &SwitchOutcome) {
    for stale in &outcome.stale {
        let result = if stale.muted { "muted" } else { "STILL ON" };
        let (input, output) = (stale.input, outcome.output);
        println!("  input {input} on output {output}: {result}");
    }
    for failure in outcome.failures() {
        eprintln!("Error: {}", failure);
    }
}

/// Make `input` the only source on `output`
pub fn switch<T: Transport>(
    controller: &mut SwitchController<T>,
    input: u8,
    output: u8,
) -> Result<SwitchOutcome> {
    let outcome = controller.switch_output(input, output)?;
    println!("Input {} -> output {}", outcome.input, outcome.output);
    report(&outcome);
    Ok(outcome)
}

pub fn connect<T: Transport>(
    controller: &mut SwitchController<T>,
    input: u8,
    output: u8,
) -> Result<()> {
    let state = controller.connect(Input::new(input)?, Output::new(output)?)?;
    print_state(&state);
    Ok(())
}

pub fn mute<T: Transport>(
    controller: &mut SwitchController<T>,
    input: u8,
    output: u8,
) -> Result<()> {
    let state = controller.mute(Input::new(input)?, Output::new(output)?)?;
    print_state(&state);
    Ok(())
}

/// Mute everything and drain the acknowledgment
pub fn mute_all<T: Transport>(controller: &mut SwitchController<T>) -> Result<()> {
    controller.mute_all_outputs()?;
    let drained = controller.resynchronize()?;
    info!("Mute all acknowledged with {} lines", drained);
    println!("All outputs muted");
    Ok(())
}

/// Walk every input across every output, then mute all
pub fn exercise<T: Transport>(controller: &mut SwitchController<T>, pause: Duration) -> Result<()> {
    status(controller)?;

    let mut failures = 0;
    for output in Output::all() {
        println!("Exercise output {}", output);
        for input in Input::all() {
            let outcome = controller.connect_and_settle(input, output)?;
            report(&outcome);
            failures += outcome.failures().len();
        }
    }

    status(controller)?;

    println!("Sleeping for {:.1} seconds", pause.as_secs_f32());
    thread::sleep(pause);

    println!("Mute all");
    mute_all(controller)?;

    if failures > 0 {
        bail!("{} crosspoint(s) failed verification", failures);
    }
    Ok(())
}
