//! ss44 - command-line control of the Broadcast Tools SS 4.4 matrix switcher
//!
//! Subcommands:
//! - `ss44 status` - Print the crosspoint state
//! - `ss44 switch <input> <output>` - Route an input, muting the old source
//! - `ss44 connect|mute <input> <output>` - Change a single crosspoint
//! - `ss44 mute-all` - Mute every output
//! - `ss44 exercise` - Walk every input across every output
//! - `ss44 ports` - List serial ports
//! - `ss44 save-settings` - Store the current options as defaults

mod commands;
mod settings;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ss44_control::{list_ports, SerialTransport, SwitchController};
use ss44_protocol::{Transport, Unit};
use ss44_sim::{SimTransport, VirtualSwitcher};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;

#[derive(Parser)]
#[command(name = "ss44")]
#[command(about = "Control a Broadcast Tools SS 4.4 matrix switcher")]
#[command(version)]
struct Cli {
    /// Serial port (e.g., /dev/ttyUSB0, COM3)
    #[arg(short, long, global = true)]
    port: Option<String>,

    /// Baud rate
    #[arg(short, long, global = true)]
    baud: Option<u32>,

    /// Switcher unit number
    #[arg(short, long, global = true)]
    unit: Option<u8>,

    /// Per-line read timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Talk to a simulated switcher instead of a serial port
    #[arg(long, global = true)]
    simulate: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List serial ports
    Ports,

    /// Store the current options as defaults
    SaveSettings,

    #[command(flatten)]
    Device(DeviceCommand),
}

/// Commands that talk to the switcher
#[derive(Subcommand)]
enum DeviceCommand {
    /// Print the crosspoint state
    Status,

    /// Route an input to an output and mute whatever else was on it
    Switch {
        /// Input (1-4)
        input: u8,
        /// Output (1-4)
        output: u8,
    },

    /// Connect one crosspoint, leaving other sources in place
    Connect {
        /// Input (1-4)
        input: u8,
        /// Output (1-4)
        output: u8,
    },

    /// Mute one crosspoint
    Mute {
        /// Input (1-4)
        input: u8,
        /// Output (1-4)
        output: u8,
    },

    /// Mute every output
    MuteAll,

    /// Switch every input to every output, then mute all
    Exercise {
        /// Pause before the final mute-all, in milliseconds
        #[arg(long)]
        pause_ms: Option<u64>,
    },
}

impl Cli {
    /// Settings file values overridden by any flags given
    fn settings(&self) -> Settings {
        let mut settings = Settings::load();
        if let Some(port) = &self.port {
            settings.port = port.clone();
        }
        if let Some(baud) = self.baud {
            settings.baud_rate = baud;
        }
        if let Some(unit) = self.unit {
            settings.unit = unit;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            settings.read_timeout_ms = timeout_ms;
        }
        settings
    }
}

fn open_controller(
    settings: &Settings,
    simulate: bool,
) -> Result<SwitchController<Box<dyn Transport>>> {
    let transport: Box<dyn Transport> = if simulate {
        tracing::info!("Using simulated switcher as unit {}", settings.unit);
        let switcher = VirtualSwitcher::new(Unit(settings.unit));
        Box::new(SimTransport::new(switcher))
    } else {
        Box::new(SerialTransport::open(&settings.serial_config())?)
    };
    let config = settings.controller_config();
    Ok(SwitchController::new(transport, config))
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ss44=info,ss44_protocol=info,ss44_control=info,ss44_sim=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let settings = cli.settings();

    match cli.command {
        Commands::Ports => {
            for port in list_ports()? {
                let product = port.product.as_deref().unwrap_or("Unknown");
                println!("{}\t{}", port.port, product);
            }
        }
        Commands::SaveSettings => {
            let path = settings.save()?;
            println!("Saved settings to {}", path.display());
        }
        Commands::Device(command) => {
            if !cli.simulate {
                println!("Communicating to SS 4.4 on port {}", settings.port);
            }
            let mut controller = open_controller(&settings, cli.simulate)?;
            run(command, &mut controller, &settings)?;
        }
    }

    Ok(())
}

fn run<T: Transport>(
    command: DeviceCommand,
    controller: &mut SwitchController<T>,
    settings: &Settings,
) -> Result<()> {
    match command {
        DeviceCommand::Status => {
            commands::status(controller)?;
        }
        DeviceCommand::Switch { input, output } => {
            commands::switch(controller, input, output)?;
        }
        DeviceCommand::Connect { input, output } => {
            commands::connect(controller, input, output)?;
        }
        DeviceCommand::Mute { input, output } => {
            commands::mute(controller, input, output)?;
        }
        DeviceCommand::MuteAll => {
            commands::mute_all(controller)?;
        }
        DeviceCommand::Exercise { pause_ms } => {
            let pause = Duration::from_millis(pause_ms.unwrap_or(settings.exercise_pause_ms));
            commands::exercise(controller, pause)?;
        }
    }
    Ok(())
}
