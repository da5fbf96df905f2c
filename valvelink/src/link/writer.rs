//! Writer loop: queued commands out to the device.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::telemetry::LinkMetrics;
use crate::transport::{Transport, TransportError};

use super::{Command, WriteFailurePolicy};

/// Pause between attempts under the retry policy.
pub(crate) const WRITE_RETRY_BACKOFF: Duration = Duration::from_millis(20);

/// Whether the loop keeps serving the queue after a delivery.
enum Delivery {
    Continue,
    Stop,
}

/// Writer-thread state for one connection.
pub(crate) struct WriterLoop {
    transport: Arc<dyn Transport>,
    outbound: Receiver<Command>,
    poll_interval: Duration,
    policy: WriteFailurePolicy,
    metrics: Arc<LinkMetrics>,
    cancel: CancellationToken,
}

impl WriterLoop {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        outbound: Receiver<Command>,
        poll_interval: Duration,
        policy: WriteFailurePolicy,
        metrics: Arc<LinkMetrics>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            transport,
            outbound,
            poll_interval,
            policy,
            metrics,
            cancel,
        }
    }

    /// Serve the queue until the stop signal is observed.
    pub(crate) fn run(self) {
        debug!(policy = %self.policy, "Writer loop started");

        while !self.cancel.is_cancelled() {
            let command = match self.outbound.recv_timeout(self.poll_interval) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => {
                    debug!("Outbound queue closed, stopping writer");
                    break;
                }
            };

            if let Delivery::Stop = self.deliver(command.into_bytes()) {
                break;
            }
        }

        info!("Writer loop stopped");
    }

    fn deliver(&self, bytes: Vec<u8>) -> Delivery {
        let extra_attempts = match self.policy {
            WriteFailurePolicy::Retry { attempts } => attempts,
            _ => 0,
        };

        let mut attempt = 0;
        loop {
            match self.transport.write_raw(&bytes) {
                Ok(()) => {
                    self.metrics.command_written();
                    return Delivery::Continue;
                }
                Err(TransportError::Closed) => {
                    debug!("Transport closed, stopping writer");
                    self.metrics.command_dropped();
                    return Delivery::Stop;
                }
                Err(e) => {
                    self.metrics.write_failed();
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        len = bytes.len(),
                        "Serial write failed"
                    );
                }
            }

            if attempt >= extra_attempts || self.cancel.is_cancelled() {
                break;
            }
            attempt += 1;
            thread::sleep(WRITE_RETRY_BACKOFF);
        }

        self.metrics.command_dropped();
        match self.policy {
            WriteFailurePolicy::StopWriter => {
                warn!("Stopping writer after write failure");
                Delivery::Stop
            }
            _ => Delivery::Continue,
        }
    }
}
