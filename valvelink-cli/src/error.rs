//! CLI error handling with operator-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and exit codes.

use std::fmt;
use std::process;

use valvelink::config::ConfigFileError;
use valvelink::link::LinkError;
use valvelink::transport::TransportError;

/// CLI-specific errors with operator-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// No serial port given on the command line or in the config file
    NoPort,
    /// Failed to bring the link up
    Connect(LinkError),
    /// Failed to enumerate serial ports
    PortList(serialport::Error),
    /// Failed to start the console input thread
    Input(std::io::Error),
}

impl CliError {
    /// Exit the process with an error message and status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::NoPort => {
                eprintln!();
                eprintln!("Pass the device with --port, or set it once in the config file:");
                eprintln!("  valvelink config init");
                eprintln!("  then edit [serial] port = ...");
                eprintln!("Use 'valvelink ports' to list attached devices.");
            }
            CliError::Connect(LinkError::Connect(TransportError::Open { .. })) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Wrong device path: run 'valvelink ports'");
                eprintln!("  2. Permissions: add your user to the 'dialout' group (Linux)");
                eprintln!("  3. Port in use: close other serial monitors");
            }
            CliError::Connect(LinkError::Recorder(_)) => {
                eprintln!();
                eprintln!("Check the [recording] path, or run with --no-record.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::NoPort => write!(f, "No serial port configured"),
            CliError::Connect(e) => write!(f, "Failed to connect: {}", e),
            CliError::PortList(e) => write!(f, "Failed to list serial ports: {}", e),
            CliError::Input(e) => write!(f, "Failed to start console input: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Connect(e) => Some(e),
            CliError::PortList(e) => Some(e),
            CliError::Input(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LinkError> for CliError {
    fn from(e: LinkError) -> Self {
        CliError::Connect(e)
    }
}
