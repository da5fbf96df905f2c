//! Reader loop: device lines in, telemetry samples out.

use std::fs::File;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::recorder::ThrottledRecorder;
use crate::telemetry::{decode_line, parse_line, ElapsedClock, LinkMetrics, TelemetrySample};
use crate::transport::{Transport, TransportError};

/// Pause after a hard read error before trying again.
const READ_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Reader-thread state for one connection.
///
/// Sole owner of the record file. The elapsed-time clock belongs to the link.
pub(crate) struct ReaderLoop {
    transport: Arc<dyn Transport>,
    inbound: Sender<TelemetrySample>,
    recorder: Option<ThrottledRecorder<File>>,
    clock: Arc<ElapsedClock>,
    metrics: Arc<LinkMetrics>,
    cancel: CancellationToken,
}

impl ReaderLoop {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        inbound: Sender<TelemetrySample>,
        recorder: Option<ThrottledRecorder<File>>,
        clock: Arc<ElapsedClock>,
        metrics: Arc<LinkMetrics>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            inbound,
            recorder,
            clock,
            metrics,
            cancel,
        }
    }

    /// Read until the stop signal is observed or the transport closes.
    pub(crate) fn run(mut self) {
        debug!("Reader loop started");
        let mut read_errors: u64 = 0;

        while !self.cancel.is_cancelled() {
            match self.transport.read_line() {
                Ok(Some(raw)) => self.handle_line(&raw),
                Ok(None) => trace!("Read timeout"),
                Err(TransportError::Closed) => {
                    debug!("Transport closed, stopping reader");
                    break;
                }
                Err(e) => {
                    read_errors += 1;
                    if read_errors <= 3 {
                        warn!(error = %e, "Serial read failed");
                    }
                    thread::sleep(READ_ERROR_BACKOFF);
                }
            }
        }

        info!(read_errors, "Reader loop stopped");
    }

    fn handle_line(&mut self, raw: &[u8]) {
        let line = decode_line(raw);
        if line.is_empty() {
            return;
        }
        self.metrics.line_read();

        let Some(reading) = parse_line(&line) else {
            self.metrics.line_dropped();
            trace!(line = %line, "Dropped malformed telemetry line");
            return;
        };

        let sample = TelemetrySample::new(self.clock.elapsed_ms(), reading);
        if self.inbound.send(sample).is_err() {
            trace!("Telemetry consumer gone, sample discarded");
        }
        self.metrics.sample_accepted();

        if let Some(recorder) = self.recorder.as_mut() {
            match recorder.record(&line) {
                Ok(true) => self.metrics.record_written(),
                Ok(false) => {}
                Err(e) => warn!(error = %e, "Failed to persist telemetry record"),
            }
        }
    }
}
