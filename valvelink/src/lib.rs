//! ValveLink - serial telemetry and command console for a valve test rig
//!
//! This library talks to a microcontroller that drives two servo valves
//! (oxidizer and fuel) over a serial line. It streams position telemetry
//! off the device, keeps the full history for plotting, appends a
//! throttled CSV record, and queues operator commands back to the device.
//!
//! # High-Level API
//!
//! The [`link`] module provides the connection manager:
//!
//! ```ignore
//! use valvelink::link::{LinkConfig, SerialLink};
//! use valvelink::telemetry::{DisplayConfig, TelemetryView};
//!
//! let mut link = SerialLink::new(LinkConfig::new("/dev/ttyACM0"));
//! link.connect()?;
//!
//! let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());
//! link.send("ignseq 15")?;
//! ```
//!
//! - [`transport`] - byte-level serial access behind the `Transport` trait
//! - [`telemetry`] - sample parsing, history and render decimation
//! - [`recorder`] - throttled CSV persistence
//! - [`config`] - `~/.valvelink/config.ini`
//! - [`logging`] - diagnostic log setup

pub mod config;
pub mod link;
pub mod logging;
pub mod recorder;
pub mod telemetry;
pub mod transport;

/// Version of the ValveLink library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
