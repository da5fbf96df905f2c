//! Point-in-time link counters.

use std::fmt;
use std::time::Duration;

/// Immutable copy of [`LinkMetrics`](super::LinkMetrics) for display.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkSnapshot {
    /// Time since the link was created
    pub uptime: Duration,
    /// Non-empty lines received from the device
    pub lines_read: u64,
    /// Lines parsed into samples
    pub samples_accepted: u64,
    /// Lines dropped as malformed
    pub lines_dropped: u64,
    /// Samples persisted by the recorder
    pub records_written: u64,
    /// Commands written to the device
    pub commands_written: u64,
    /// Failed write attempts
    pub write_failures: u64,
    /// Commands given up on after failing
    pub commands_dropped: u64,
}

impl LinkSnapshot {
    /// Accepted samples per second over the link uptime.
    pub fn samples_per_second(&self) -> f64 {
        let secs = self.uptime.as_secs_f64();
        if secs > 0.0 {
            self.samples_accepted as f64 / secs
        } else {
            0.0
        }
    }
}

impl fmt::Display for LinkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} samples ({:.1}/s), {} dropped, {} recorded, {} commands sent, {} write failures",
            self.samples_accepted,
            self.samples_per_second(),
            self.lines_dropped,
            self.records_written,
            self.commands_written,
            self.write_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_with_zero_uptime() {
        let snapshot = LinkSnapshot {
            samples_accepted: 10,
            ..Default::default()
        };
        assert_eq!(snapshot.samples_per_second(), 0.0);
    }

    #[test]
    fn test_rate() {
        let snapshot = LinkSnapshot {
            uptime: Duration::from_secs(2),
            samples_accepted: 100,
            ..Default::default()
        };
        assert_eq!(snapshot.samples_per_second(), 50.0);
    }

    #[test]
    fn test_display() {
        let snapshot = LinkSnapshot {
            uptime: Duration::from_secs(1),
            samples_accepted: 50,
            lines_dropped: 2,
            records_written: 40,
            commands_written: 3,
            ..Default::default()
        };
        assert_eq!(
            snapshot.to_string(),
            "50 samples (50.0/s), 2 dropped, 40 recorded, 3 commands sent, 0 write failures"
        );
    }
}
