//! Runtime configuration of a serial link.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::recorder::{DEFAULT_RECORD_FILE, DEFAULT_RECORD_INTERVAL};
use crate::transport::SerialSettings;

use super::OutboundCapacity;

/// Default wait of the writer loop on an empty queue.
pub const DEFAULT_WRITER_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Default time each loop thread is given to stop on disconnect.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// What the writer does when a command cannot be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteFailurePolicy {
    /// Log the failure, drop the command, keep serving the queue.
    #[default]
    LogAndContinue,
    /// Re-attempt the same command up to `attempts` more times, then drop it.
    Retry { attempts: u32 },
    /// Log the failure and stop the writer loop. The reader keeps running.
    StopWriter,
}

impl fmt::Display for WriteFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteFailurePolicy::LogAndContinue => write!(f, "continue"),
            WriteFailurePolicy::Retry { attempts } => write!(f, "retry:{}", attempts),
            WriteFailurePolicy::StopWriter => write!(f, "stop"),
        }
    }
}

impl FromStr for WriteFailurePolicy {
    type Err = String;

    /// Parse `continue`, `stop` or `retry:<attempts>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "continue" => Ok(WriteFailurePolicy::LogAndContinue),
            "stop" => Ok(WriteFailurePolicy::StopWriter),
            _ => {
                let attempts = s
                    .strip_prefix("retry:")
                    .and_then(|n| n.trim().parse().ok())
                    .ok_or_else(|| {
                        format!("unknown write failure policy '{}'", s)
                    })?;
                Ok(WriteFailurePolicy::Retry { attempts })
            }
        }
    }
}

/// Everything a [`SerialLink`](super::SerialLink) needs to run.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Device and line parameters.
    pub serial: SerialSettings,
    /// How long the writer waits on an empty queue before re-checking stop.
    pub writer_poll_interval: Duration,
    /// Per-thread join deadline on disconnect.
    pub join_timeout: Duration,
    /// Telemetry record file; `None` disables recording.
    pub record_path: Option<PathBuf>,
    /// Minimum interval between persisted records.
    pub record_interval: Duration,
    /// Outbound queue bound.
    pub outbound_capacity: OutboundCapacity,
    /// Writer behavior on write failure.
    pub write_failure: WriteFailurePolicy,
}

impl LinkConfig {
    /// Configuration for `port` with defaults everywhere else.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            serial: SerialSettings::new(port),
            writer_poll_interval: DEFAULT_WRITER_POLL_INTERVAL,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
            record_path: Some(PathBuf::from(DEFAULT_RECORD_FILE)),
            record_interval: DEFAULT_RECORD_INTERVAL,
            outbound_capacity: OutboundCapacity::default(),
            write_failure: WriteFailurePolicy::default(),
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.serial.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.serial.read_timeout = timeout;
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.serial.write_timeout = timeout;
        self
    }

    pub fn with_writer_poll_interval(mut self, interval: Duration) -> Self {
        self.writer_poll_interval = interval;
        self
    }

    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    pub fn with_record_path(mut self, path: Option<PathBuf>) -> Self {
        self.record_path = path;
        self
    }

    pub fn with_record_interval(mut self, interval: Duration) -> Self {
        self.record_interval = interval;
        self
    }

    pub fn with_outbound_capacity(mut self, capacity: OutboundCapacity) -> Self {
        self.outbound_capacity = capacity;
        self
    }

    pub fn with_write_failure(mut self, policy: WriteFailurePolicy) -> Self {
        self.write_failure = policy;
        self
    }
}
