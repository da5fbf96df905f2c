//! Rate-limited persistence of accepted telemetry lines.
//!
//! The reader thread hands every accepted line to a [`ThrottledRecorder`].
//! A line is written only when at least `interval` has passed since the last
//! written record; everything else is skipped. Throttling applies to the file
//! only. The in-memory history always receives every sample.
//!
//! # Output Format
//!
//! One record per line, the whitespace-split tokens of the device line joined
//! with commas (`ox_pos,fuel_pos`). No header, no timestamp column. The file
//! is opened in append mode; removing an earlier run's file is left to the
//! caller.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

/// Default minimum interval between persisted records.
pub const DEFAULT_RECORD_INTERVAL: Duration = Duration::from_millis(20);

/// Default record file name.
pub const DEFAULT_RECORD_FILE: &str = "ServoData.csv";

/// Open `path` for appending, creating it if missing.
pub fn open_record_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// Writes at most one record per interval to `W`.
pub struct ThrottledRecorder<W: Write> {
    writer: W,
    interval: Duration,
    last_write: Instant,
}

impl<W: Write> ThrottledRecorder<W> {
    /// Create a recorder whose interval starts now.
    ///
    /// A line offered within `interval` of creation is not written.
    pub fn new(writer: W, interval: Duration) -> Self {
        Self::starting_at(writer, interval, Instant::now())
    }

    /// Create a recorder whose first interval starts at `start`.
    pub fn starting_at(writer: W, interval: Duration, start: Instant) -> Self {
        Self {
            writer,
            interval,
            last_write: start,
        }
    }

    /// Offer a line for persistence at the current time.
    ///
    /// Returns whether a record was written.
    pub fn record(&mut self, line: &str) -> io::Result<bool> {
        self.record_at(line, Instant::now())
    }

    /// Offer a line for persistence at `now`.
    ///
    /// The record is flushed before returning. The interval restarts even if
    /// the write fails, so a failing disk is retried at the throttled rate.
    pub fn record_at(&mut self, line: &str, now: Instant) -> io::Result<bool> {
        if now.saturating_duration_since(self.last_write) < self.interval {
            return Ok(false);
        }
        self.last_write = now;

        let record = line.split_whitespace().collect::<Vec<_>>().join(",");
        writeln!(self.writer, "{}", record)?;
        self.writer.flush()?;
        Ok(true)
    }

    /// Consume the recorder and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
