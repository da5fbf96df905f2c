//! ValveLink CLI - operator console for the valve test rig
//!
//! This binary wires the `valvelink` library to a terminal: it runs the
//! serial link, forwards typed commands and reports live telemetry.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::monitor::MonitorArgs;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "valvelink")]
#[command(version = valvelink::VERSION)]
#[command(about = "Serial console for the oxidizer/fuel valve controller", long_about = None)]
struct Cli {
    /// Config file (default: ~/.valvelink/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to the controller, stream telemetry and send commands
    Monitor {
        /// Serial device (overrides [serial] port)
        #[arg(long, short)]
        port: Option<String>,

        /// Baud rate (overrides [serial] baud_rate)
        #[arg(long, short)]
        baud: Option<u32>,

        /// Telemetry record file (overrides [recording] path)
        #[arg(long, conflicts_with = "no_record")]
        record: Option<PathBuf>,

        /// Do not write the telemetry record file
        #[arg(long)]
        no_record: bool,

        /// Append to the existing record file instead of starting fresh
        #[arg(long, conflicts_with = "no_record")]
        append: bool,
    },

    /// List serial ports reported by the OS
    Ports,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Monitor {
            port,
            baud,
            record,
            no_record,
            append,
        } => CliRunner::new(cli.config.as_deref()).and_then(|runner| {
            commands::monitor::run(
                MonitorArgs {
                    port,
                    baud,
                    record,
                    no_record,
                    append,
                },
                &runner,
            )
        }),
        Commands::Ports => commands::ports::run(),
        Commands::Config { command } => commands::config::run(command, cli.config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
