//! Lock-free link counters.
//!
//! Shared between the reader thread, the writer thread and the link owner.
//! All operations use `Relaxed` ordering: the counters are independent and
//! only feed status output, never control flow.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::LinkSnapshot;

/// Counters for one link, accumulated across reconnects.
#[derive(Debug)]
pub struct LinkMetrics {
    start_time: Instant,

    // === Reader ===
    /// Non-empty lines received from the device
    lines_read: AtomicU64,
    /// Lines parsed into samples
    samples_accepted: AtomicU64,
    /// Lines dropped as malformed
    lines_dropped: AtomicU64,
    /// Samples persisted by the recorder
    records_written: AtomicU64,

    // === Writer ===
    /// Commands written to the device
    commands_written: AtomicU64,
    /// Failed write attempts
    write_failures: AtomicU64,
    /// Commands given up on after failing
    commands_dropped: AtomicU64,
}

impl LinkMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            lines_read: AtomicU64::new(0),
            samples_accepted: AtomicU64::new(0),
            lines_dropped: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            commands_written: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
            commands_dropped: AtomicU64::new(0),
        }
    }

    pub fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sample_accepted(&self) {
        self.samples_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn line_dropped(&self) {
        self.lines_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_written(&self) {
        self.commands_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_failed(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn command_dropped(&self) {
        self.commands_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counter values.
    pub fn snapshot(&self) -> LinkSnapshot {
        LinkSnapshot {
            uptime: self.start_time.elapsed(),
            lines_read: self.lines_read.load(Ordering::Relaxed),
            samples_accepted: self.samples_accepted.load(Ordering::Relaxed),
            lines_dropped: self.lines_dropped.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            commands_written: self.commands_written.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            commands_dropped: self.commands_dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for LinkMetrics {
    fn default() -> Self {
        Self::new()
    }
}
