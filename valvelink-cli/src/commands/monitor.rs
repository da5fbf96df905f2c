//! Monitor command - live link to the rig controller.
//!
//! Connects, forwards each console line to the device as a text command and
//! refreshes the telemetry view on the display tick. Typing `quit` (or
//! closing stdin) disconnects and prints the shutdown report.
//!
//! Unless `--append` is given or `[recording] fresh_on_start` is off, the
//! previous run's record file is removed before connecting.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{select, tick, Sender};
use tracing::{debug, info, warn};
use valvelink::config::ConfigFile;
use valvelink::link::{CommandSender, LinkConfig, SerialLink, ThreadExit};
use valvelink::telemetry::TelemetryView;

use crate::error::CliError;
use crate::runner::CliRunner;

/// How often the status line is printed.
const STATUS_INTERVAL: Duration = Duration::from_secs(1);

/// Status lines between link statistics log entries.
const STATS_EVERY: u32 = 10;

/// Arguments for the monitor command.
#[derive(Debug, Default)]
pub struct MonitorArgs {
    pub port: Option<String>,
    pub baud: Option<u32>,
    pub record: Option<PathBuf>,
    pub no_record: bool,
    /// Keep the previous run's records instead of starting a fresh file.
    pub append: bool,
}

/// One line typed at the console.
#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput {
    Skip,
    Quit,
    Command(String),
}

fn parse_input(line: &str) -> ConsoleInput {
    match line.trim() {
        "" => ConsoleInput::Skip,
        "quit" | "exit" => ConsoleInput::Quit,
        text => ConsoleInput::Command(text.to_string()),
    }
}

/// Merge command-line overrides into the file configuration.
fn build_link_config(args: &MonitorArgs, config: &ConfigFile) -> Result<LinkConfig, CliError> {
    let port = args
        .port
        .clone()
        .or_else(|| config.serial.port.clone())
        .ok_or(CliError::NoPort)?;

    let mut link_config = config.to_link_config(port);
    if let Some(baud) = args.baud {
        link_config = link_config.with_baud_rate(baud);
    }
    if let Some(path) = &args.record {
        link_config = link_config.with_record_path(Some(path.clone()));
    }
    if args.no_record {
        link_config = link_config.with_record_path(None);
    }
    Ok(link_config)
}

/// Whether this run starts a fresh record file.
fn starts_fresh_record(args: &MonitorArgs, config: &ConfigFile) -> bool {
    config.recording.fresh_on_start && !args.append
}

/// Remove the previous run's record file. A missing file is not an error.
///
/// Returns whether a file was removed.
fn clear_previous_record(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Run the monitor command.
pub fn run(args: MonitorArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("monitor");

    let link_config = build_link_config(&args, runner.config())?;
    if let Some(path) = &link_config.record_path {
        if starts_fresh_record(&args, runner.config()) {
            match clear_previous_record(path) {
                Ok(true) => {
                    info!(path = %path.display(), "Removed previous record file");
                    println!("Removed existing {}", path.display());
                }
                Ok(false) => {}
                // The recorder appends, so a leftover file only merges runs.
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove previous record file");
                    eprintln!("Failed to remove {}: {}", path.display(), e);
                }
            }
        }
    }

    let mut link = SerialLink::new(link_config);
    link.connect()?;

    let serial = &link.config().serial;
    println!(
        "Connected to {} at {} baud. Type a command and press Enter, 'quit' to exit.",
        serial.port, serial.baud_rate
    );
    if let Some(path) = &link.config().record_path {
        println!("Recording to {}", path.display());
    }

    let (quit_tx, quit_rx) = crossbeam_channel::bounded(1);
    // The input thread blocks on stdin and is left running at exit.
    let _input = spawn_console_input(link.command_sender(), quit_tx).map_err(CliError::Input)?;

    let display = runner.config().display_config();
    let mut view = TelemetryView::new(link.telemetry(), display.clone());
    let display_tick = tick(display.tick_interval);
    let status_tick = tick(STATUS_INTERVAL);
    let mut plotted = 0usize;
    let mut status_count = 0u32;

    loop {
        select! {
            recv(display_tick) -> _ => {
                if let Some(series) = view.tick() {
                    plotted = series.len();
                    if let Some(latest) = view.store().latest() {
                        debug!(
                            points = plotted,
                            elapsed_ms = latest.elapsed_ms,
                            ox = latest.ox_pos,
                            fuel = latest.fuel_pos,
                            "Display refreshed"
                        );
                    }
                }
            }
            recv(status_tick) -> _ => {
                print_status(&view, plotted);
                status_count += 1;
                if status_count % STATS_EVERY == 0 {
                    info!(stats = %link.stats(), "Link statistics");
                }
            }
            recv(quit_rx) -> _ => break,
        }
    }

    println!("Disconnecting...");
    let report = link.disconnect();
    let stats = link.stats();
    info!(%stats, reader = ?report.reader, writer = ?report.writer, "Monitor finished");

    println!("Session: {}", stats);
    if !report.is_clean() {
        println!(
            "Reader: {}, writer: {}",
            describe_exit(report.reader),
            describe_exit(report.writer)
        );
    }
    Ok(())
}

fn print_status(view: &TelemetryView, plotted: usize) {
    match view.store().latest() {
        Some(sample) => println!(
            "t={:>9.0} ms  ox={:>5}  fuel={:>5}  history={}  plotted={}",
            sample.elapsed_ms,
            sample.ox_pos,
            sample.fuel_pos,
            view.store().len(),
            plotted
        ),
        None => println!("Waiting for telemetry..."),
    }
}

fn describe_exit(exit: ThreadExit) -> &'static str {
    match exit {
        ThreadExit::Joined => "stopped",
        ThreadExit::Panicked => "panicked",
        ThreadExit::Abandoned => "still running (abandoned)",
        ThreadExit::NotRunning => "not running",
    }
}

/// Read console lines on a dedicated thread and queue them as commands.
fn spawn_console_input(
    commands: CommandSender,
    quit: Sender<()>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        warn!(error = %e, "Console input failed");
                        break;
                    }
                };
                match parse_input(&line) {
                    ConsoleInput::Skip => {}
                    ConsoleInput::Quit => break,
                    ConsoleInput::Command(text) => {
                        debug!(command = %text, "Queueing console command");
                        if let Err(e) = commands.send(text) {
                            eprintln!("Command not sent: {}", e);
                        }
                    }
                }
            }
            let _ = quit.send(());
        })
}
