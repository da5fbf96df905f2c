//! Serial link manager.
//!
//! [`SerialLink`] owns the transport to the rig controller and the two
//! background threads that service it:
//!
//! - **reader** - blocks on `read_line`, parses telemetry, pushes samples onto
//!   the inbound queue and feeds the throttled recorder
//! - **writer** - waits on the outbound queue and writes commands
//!
//! ```text
//! operator ──send──► outbound queue ──► writer ──► transport ──► device
//! device ──► transport ──► reader ──┬──► inbound queue ──► TelemetryView
//!                                   └──► ThrottledRecorder ──► record file
//! ```
//!
//! Both queues are FIFO channels with a single producer and a single
//! consumer. They outlive individual connections, so the display side keeps
//! one receiver across reconnects. The elapsed-time clock is shared the same
//! way: it is anchored by the first sample the link ever accepts, so the
//! history's time axis keeps increasing after a reconnect.
//!
//! # Shutdown
//!
//! Each connection gets a fresh [`CancellationToken`]. `disconnect` cancels
//! it, waits up to `join_timeout` for each thread, then closes the transport
//! whether or not the threads stopped. A thread that misses its deadline is
//! abandoned: its handle is dropped and the outcome is reported in the
//! returned [`ShutdownReport`]. An abandoned thread exits on its own once
//! its blocking call returns, because it observes the cancelled token or
//! the closed transport.
//!
//! # Example
//!
//! ```ignore
//! use valvelink::link::{LinkConfig, SerialLink};
//! use valvelink::telemetry::{DisplayConfig, TelemetryView};
//!
//! let mut link = SerialLink::new(LinkConfig::new("/dev/ttyACM0"));
//! link.connect()?;
//! let mut view = TelemetryView::new(link.telemetry(), DisplayConfig::default());
//!
//! link.send("cycleoxvalve 2")?;
//! if let Some(series) = view.tick() {
//!     render(&series);
//! }
//! let report = link.disconnect();
//! ```

mod command;
mod config;
mod error;
mod reader;
mod writer;

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::recorder::{open_record_file, ThrottledRecorder};
use crate::telemetry::{ElapsedClock, LinkMetrics, LinkSnapshot, TelemetrySample};
use crate::transport::{Connector, SerialConnector, Transport};

pub use command::{Command, CommandSender, OutboundCapacity};
pub use config::{
    LinkConfig, WriteFailurePolicy, DEFAULT_JOIN_TIMEOUT, DEFAULT_WRITER_POLL_INTERVAL,
};
pub use error::LinkError;

use reader::ReaderLoop;
use writer::WriterLoop;

/// Interval at which a pending join re-checks whether the thread finished.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Whether a transport is currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// How a loop thread ended during disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadExit {
    /// Stopped and joined before the deadline.
    Joined,
    /// Terminated by a panic.
    Panicked,
    /// Still running at the deadline; left to finish on its own.
    Abandoned,
    /// No thread was running.
    NotRunning,
}

/// Outcome of a disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub reader: ThreadExit,
    pub writer: ThreadExit,
}

impl ShutdownReport {
    fn idle() -> Self {
        Self {
            reader: ThreadExit::NotRunning,
            writer: ThreadExit::NotRunning,
        }
    }

    /// Both threads stopped in time.
    pub fn is_clean(&self) -> bool {
        self.reader == ThreadExit::Joined && self.writer == ThreadExit::Joined
    }
}

/// Resources of one open connection.
struct Session {
    transport: Arc<dyn Transport>,
    cancel: CancellationToken,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

/// Connection manager for the rig controller.
pub struct SerialLink {
    config: LinkConfig,
    connector: Box<dyn Connector>,
    outbound_tx: Sender<Command>,
    outbound_rx: Receiver<Command>,
    inbound_tx: Sender<TelemetrySample>,
    inbound_rx: Receiver<TelemetrySample>,
    metrics: Arc<LinkMetrics>,
    clock: Arc<ElapsedClock>,
    session: Option<Session>,
}

impl SerialLink {
    /// Link to a real serial device.
    pub fn new(config: LinkConfig) -> Self {
        Self::with_connector(config, SerialConnector)
    }

    /// Link whose transports come from `connector`.
    pub fn with_connector(config: LinkConfig, connector: impl Connector + 'static) -> Self {
        let (outbound_tx, outbound_rx) = config.outbound_capacity.channel();
        let (inbound_tx, inbound_rx) = crossbeam_channel::unbounded();
        Self {
            config,
            connector: Box::new(connector),
            outbound_tx,
            outbound_rx,
            inbound_tx,
            inbound_rx,
            metrics: Arc::new(LinkMetrics::new()),
            clock: Arc::new(ElapsedClock::new()),
            session: None,
        }
    }

    /// Open the transport and start the reader and writer threads.
    ///
    /// Does nothing when already connected. On failure the link stays
    /// disconnected and nothing is retried.
    pub fn connect(&mut self) -> Result<(), LinkError> {
        if self.session.is_some() {
            debug!(port = %self.config.serial.port, "Already connected");
            return Ok(());
        }

        let transport = self
            .connector
            .open(&self.config.serial)
            .map_err(LinkError::Connect)?;

        match self.start_session(Arc::clone(&transport)) {
            Ok(session) => {
                self.session = Some(session);
                info!(
                    port = %self.config.serial.port,
                    baud = self.config.serial.baud_rate,
                    recording = self.config.record_path.is_some(),
                    "Serial link connected"
                );
                Ok(())
            }
            Err(e) => {
                transport.close();
                Err(e)
            }
        }
    }

    fn start_session(&self, transport: Arc<dyn Transport>) -> Result<Session, LinkError> {
        let recorder = match &self.config.record_path {
            Some(path) => {
                let file = open_record_file(path).map_err(LinkError::Recorder)?;
                Some(ThrottledRecorder::new(file, self.config.record_interval))
            }
            None => None,
        };

        let cancel = CancellationToken::new();

        let reader_loop = ReaderLoop::new(
            Arc::clone(&transport),
            self.inbound_tx.clone(),
            recorder,
            Arc::clone(&self.clock),
            Arc::clone(&self.metrics),
            cancel.clone(),
        );
        let reader = thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || reader_loop.run())
            .map_err(|source| LinkError::Spawn {
                name: "reader",
                source,
            })?;

        let writer_loop = WriterLoop::new(
            Arc::clone(&transport),
            self.outbound_rx.clone(),
            self.config.writer_poll_interval,
            self.config.write_failure,
            Arc::clone(&self.metrics),
            cancel.clone(),
        );
        let writer = match thread::Builder::new()
            .name("serial-writer".to_string())
            .spawn(move || writer_loop.run())
        {
            Ok(handle) => handle,
            Err(source) => {
                cancel.cancel();
                transport.close();
                join_within(reader, "reader", self.config.join_timeout);
                return Err(LinkError::Spawn {
                    name: "writer",
                    source,
                });
            }
        };

        Ok(Session {
            transport,
            cancel,
            reader: Some(reader),
            writer: Some(writer),
        })
    }

    /// Stop both threads and close the transport.
    ///
    /// Each thread gets `join_timeout` to observe the stop signal. The
    /// transport is closed afterwards in every case. Calling this while
    /// disconnected is a no-op.
    pub fn disconnect(&mut self) -> ShutdownReport {
        let Some(mut session) = self.session.take() else {
            return ShutdownReport::idle();
        };

        session.cancel.cancel();
        let timeout = self.config.join_timeout;
        let report = ShutdownReport {
            reader: session
                .reader
                .take()
                .map_or(ThreadExit::NotRunning, |h| join_within(h, "reader", timeout)),
            writer: session
                .writer
                .take()
                .map_or(ThreadExit::NotRunning, |h| join_within(h, "writer", timeout)),
        };

        session.transport.close();

        if report.is_clean() {
            info!(port = %self.config.serial.port, "Serial link disconnected");
        } else {
            warn!(
                port = %self.config.serial.port,
                reader = ?report.reader,
                writer = ?report.writer,
                "Serial link disconnected with unclean thread shutdown"
            );
        }
        report
    }

    pub fn state(&self) -> ConnectionState {
        if self.session.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Queue a command for the device.
    ///
    /// Commands queued while disconnected are written after the next
    /// successful connect.
    pub fn send(&self, command: impl Into<Command>) -> Result<(), LinkError> {
        self.command_sender().send(command)
    }

    /// Handle for queueing commands from other threads.
    pub fn command_sender(&self) -> CommandSender {
        CommandSender::new(self.outbound_tx.clone(), self.config.outbound_capacity)
    }

    /// Receiving end of the inbound telemetry queue.
    pub fn telemetry(&self) -> Receiver<TelemetrySample> {
        self.inbound_rx.clone()
    }

    /// Current link counters.
    pub fn stats(&self) -> LinkSnapshot {
        self.metrics.snapshot()
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Join `handle` if it finishes within `timeout`, otherwise abandon it.
fn join_within(handle: JoinHandle<()>, name: &str, timeout: Duration) -> ThreadExit {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            warn!(
                thread = name,
                timeout_ms = timeout.as_millis() as u64,
                "Thread did not stop in time, abandoning it"
            );
            return ThreadExit::Abandoned;
        }
        thread::sleep(JOIN_POLL_INTERVAL);
    }

    match handle.join() {
        Ok(()) => ThreadExit::Joined,
        Err(e) => {
            warn!(thread = name, "Thread panicked: {:?}", e);
            ThreadExit::Panicked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MemoryConnector, MemoryTransport, TransportError};

    fn memory_link() -> (SerialLink, crate::transport::MemoryDevice) {
        let (transport, device) = MemoryTransport::pair(Duration::from_millis(20));
        let config = LinkConfig::new("mem0")
            .with_record_path(None)
            .with_writer_poll_interval(Duration::from_millis(20));
        let link = SerialLink::with_connector(config, MemoryConnector::new(transport));
        (link, device)
    }

    #[test]
    fn test_starts_disconnected() {
        let (link, _device) = memory_link();
        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(!link.is_connected());
    }

    #[test]
    fn test_connect_and_disconnect() {
        let (mut link, device) = memory_link();
        link.connect().unwrap();
        assert_eq!(link.state(), ConnectionState::Connected);

        let report = link.disconnect();
        assert!(report.is_clean());
        assert_eq!(link.state(), ConnectionState::Disconnected);
        assert!(device.is_closed());
    }

    #[test]
    fn test_connect_twice_is_noop() {
        let (transport, _device) = MemoryTransport::pair(Duration::from_millis(20));
        let connector = MemoryConnector::new(transport);
        let config = LinkConfig::new("mem0").with_record_path(None);
        let mut link = SerialLink::with_connector(config, connector);

        link.connect().unwrap();
        link.connect().unwrap();
        assert!(link.is_connected());
    }

    #[test]
    fn test_connect_failure_surfaces_and_stays_disconnected() {
        let config = LinkConfig::new("/dev/missing").with_record_path(None);
        let mut link = SerialLink::with_connector(config, MemoryConnector::unavailable());

        let err = link.connect().unwrap_err();
        assert!(matches!(
            err,
            LinkError::Connect(TransportError::Open { .. })
        ));
        assert!(!link.is_connected());
    }

    #[test]
    fn test_disconnect_when_idle() {
        let (mut link, _device) = memory_link();
        let report = link.disconnect();
        assert_eq!(report.reader, ThreadExit::NotRunning);
        assert_eq!(report.writer, ThreadExit::NotRunning);
    }

    #[test]
    fn test_unwritable_record_path_fails_connect() {
        let (transport, device) = MemoryTransport::pair(Duration::from_millis(20));
        let config = LinkConfig::new("mem0")
            .with_record_path(Some("/nonexistent-dir/valvelink/ServoData.csv".into()));
        let mut link = SerialLink::with_connector(config, MemoryConnector::new(transport));

        assert!(matches!(link.connect(), Err(LinkError::Recorder(_))));
        assert!(!link.is_connected());
        assert!(device.is_closed());
    }

    #[test]
    fn test_join_within_abandons_slow_thread() {
        let handle = thread::spawn(|| thread::sleep(Duration::from_millis(300)));
        let exit = join_within(handle, "slow", Duration::from_millis(20));
        assert_eq!(exit, ThreadExit::Abandoned);
    }

    #[test]
    fn test_join_within_reports_panic() {
        let handle = thread::spawn(|| panic!("boom"));
        let exit = join_within(handle, "panicky", Duration::from_secs(1));
        assert_eq!(exit, ThreadExit::Panicked);
    }

    #[test]
    fn test_drop_disconnects() {
        let (mut link, device) = memory_link();
        link.connect().unwrap();
        drop(link);
        assert!(device.is_closed());
    }
}
