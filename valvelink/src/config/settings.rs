//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::link::{LinkConfig, OutboundCapacity, WriteFailurePolicy};
use crate::telemetry::DisplayConfig;

/// Complete configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Serial device settings
    pub serial: SerialSection,
    /// Reader/writer loop settings
    pub link: LinkSettings,
    /// Telemetry record file settings
    pub recording: RecordingSettings,
    /// Display tick settings
    pub display: DisplaySettings,
    /// Diagnostic log settings
    pub logging: LoggingSettings,
}

/// `[serial]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSection {
    /// Device path; `None` means it must be given on the command line.
    pub port: Option<String>,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
}

/// `[link]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSettings {
    /// Writer wait on an empty queue, in milliseconds.
    pub writer_poll_ms: u64,
    /// Per-thread join deadline on disconnect, in milliseconds.
    pub join_timeout_ms: u64,
    /// Outbound queue bound; `0` means unbounded.
    pub outbound_capacity: usize,
    pub write_failure: WriteFailurePolicy,
}

/// `[recording]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSettings {
    pub enabled: bool,
    pub path: PathBuf,
    /// Remove the previous run's file before connecting.
    pub fresh_on_start: bool,
    /// Minimum interval between records, in milliseconds.
    pub interval_ms: u64,
}

/// `[display]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub tick_ms: u64,
    pub target_points: usize,
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl ConfigFile {
    /// Runtime link configuration for `port`.
    pub fn to_link_config(&self, port: impl Into<String>) -> LinkConfig {
        let outbound_capacity = match self.link.outbound_capacity {
            0 => OutboundCapacity::Unbounded,
            n => OutboundCapacity::Bounded(n),
        };
        let record_path = self
            .recording
            .enabled
            .then(|| self.recording.path.clone());

        LinkConfig::new(port)
            .with_baud_rate(self.serial.baud_rate)
            .with_read_timeout(Duration::from_millis(self.serial.read_timeout_ms))
            .with_write_timeout(Duration::from_millis(self.serial.write_timeout_ms))
            .with_writer_poll_interval(Duration::from_millis(self.link.writer_poll_ms))
            .with_join_timeout(Duration::from_millis(self.link.join_timeout_ms))
            .with_record_path(record_path)
            .with_record_interval(Duration::from_millis(self.recording.interval_ms))
            .with_outbound_capacity(outbound_capacity)
            .with_write_failure(self.link.write_failure)
    }

    /// Runtime display configuration.
    pub fn display_config(&self) -> DisplayConfig {
        DisplayConfig {
            tick_interval: Duration::from_millis(self.display.tick_ms),
            target_points: self.display.target_points,
        }
    }
}
