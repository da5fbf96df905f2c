//! Default values for all configuration settings.

use std::path::PathBuf;

use super::settings::*;
use crate::link::{self, WriteFailurePolicy};
use crate::{recorder, telemetry, transport};

pub const DEFAULT_BAUD_RATE: u32 = transport::DEFAULT_BAUD_RATE;
pub const DEFAULT_READ_TIMEOUT_MS: u64 = transport::DEFAULT_READ_TIMEOUT.as_millis() as u64;
pub const DEFAULT_WRITE_TIMEOUT_MS: u64 = transport::DEFAULT_WRITE_TIMEOUT.as_millis() as u64;

pub const DEFAULT_WRITER_POLL_MS: u64 = link::DEFAULT_WRITER_POLL_INTERVAL.as_millis() as u64;
pub const DEFAULT_JOIN_TIMEOUT_MS: u64 = link::DEFAULT_JOIN_TIMEOUT.as_millis() as u64;
/// Unbounded.
pub const DEFAULT_OUTBOUND_CAPACITY: usize = 0;

pub const DEFAULT_RECORD_PATH: &str = recorder::DEFAULT_RECORD_FILE;
pub const DEFAULT_RECORD_INTERVAL_MS: u64 = recorder::DEFAULT_RECORD_INTERVAL.as_millis() as u64;
pub const DEFAULT_FRESH_ON_START: bool = true;

pub const DEFAULT_TICK_MS: u64 = telemetry::DEFAULT_TICK_INTERVAL.as_millis() as u64;
pub const DEFAULT_TARGET_POINTS: usize = telemetry::DEFAULT_TARGET_POINTS;

pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_FILE: &str = "valvelink.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            serial: SerialSection {
                port: None,
                baud_rate: DEFAULT_BAUD_RATE,
                read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
                write_timeout_ms: DEFAULT_WRITE_TIMEOUT_MS,
            },
            link: LinkSettings {
                writer_poll_ms: DEFAULT_WRITER_POLL_MS,
                join_timeout_ms: DEFAULT_JOIN_TIMEOUT_MS,
                outbound_capacity: DEFAULT_OUTBOUND_CAPACITY,
                write_failure: WriteFailurePolicy::default(),
            },
            recording: RecordingSettings {
                enabled: true,
                path: PathBuf::from(DEFAULT_RECORD_PATH),
                interval_ms: DEFAULT_RECORD_INTERVAL_MS,
                fresh_on_start: DEFAULT_FRESH_ON_START,
            },
            display: DisplaySettings {
                tick_ms: DEFAULT_TICK_MS,
                target_points: DEFAULT_TARGET_POINTS,
            },
            logging: LoggingSettings {
                directory: PathBuf::from(DEFAULT_LOG_DIR),
                file: DEFAULT_LOG_FILE.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_defaults_match_runtime_defaults() {
        let config = ConfigFile::default();
        let link_config = config.to_link_config("/dev/ttyACM0");
        let runtime = crate::link::LinkConfig::new("/dev/ttyACM0");

        assert_eq!(link_config.serial, runtime.serial);
        assert_eq!(link_config.writer_poll_interval, runtime.writer_poll_interval);
        assert_eq!(link_config.join_timeout, runtime.join_timeout);
        assert_eq!(link_config.record_path, runtime.record_path);
        assert_eq!(link_config.record_interval, runtime.record_interval);
        assert_eq!(link_config.outbound_capacity, runtime.outbound_capacity);
        assert_eq!(link_config.write_failure, runtime.write_failure);
        assert_eq!(config.display_config(), crate::telemetry::DisplayConfig::default());
    }
}
