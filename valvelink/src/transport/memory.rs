//! Scripted in-memory device.
//!
//! `MemoryTransport` implements [`Transport`] on top of two channels. The
//! paired [`MemoryDevice`] plays the rig controller: it emits telemetry lines
//! and observes the bytes the host wrote. Used by the test suite and by dry
//! runs without hardware attached.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use super::{Connector, SerialSettings, Transport, TransportError};

/// Host side of an in-memory link.
pub struct MemoryTransport {
    from_device: Receiver<Vec<u8>>,
    to_device: Sender<Vec<u8>>,
    read_timeout: Duration,
    open: AtomicBool,
    failing_writes: AtomicU32,
}

impl MemoryTransport {
    /// Create a transport and the device that drives it.
    pub fn pair(read_timeout: Duration) -> (Arc<Self>, MemoryDevice) {
        let (device_tx, host_rx) = crossbeam_channel::unbounded();
        let (host_tx, device_rx) = crossbeam_channel::unbounded();
        let transport = Arc::new(Self {
            from_device: host_rx,
            to_device: host_tx,
            read_timeout,
            open: AtomicBool::new(true),
            failing_writes: AtomicU32::new(0),
        });
        let device = MemoryDevice {
            tx: device_tx,
            rx: device_rx,
            transport: Arc::clone(&transport),
        };
        (transport, device)
    }

    fn reopen(&self) {
        self.open.store(true, Ordering::SeqCst);
    }
}

impl Transport for MemoryTransport {
    fn read_line(&self) -> Result<Option<Vec<u8>>, TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        match self.from_device.recv_timeout(self.read_timeout) {
            Ok(line) => Ok(Some(line)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        let injected = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        self.to_device
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Device side of an in-memory link.
pub struct MemoryDevice {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    transport: Arc<MemoryTransport>,
}

impl MemoryDevice {
    /// Emit one newline-terminated line.
    pub fn emit_line(&self, line: &str) {
        let mut bytes = line.as_bytes().to_vec();
        bytes.push(b'\n');
        self.emit_raw(bytes);
    }

    /// Emit bytes exactly as given.
    pub fn emit_raw(&self, bytes: impl Into<Vec<u8>>) {
        // The host end lives inside `transport`, so the channel stays open.
        let _ = self.tx.send(bytes.into());
    }

    /// Wait up to `timeout` for the next write from the host.
    pub fn recv_written(&self, timeout: Duration) -> Option<Vec<u8>> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// All writes received so far, without waiting.
    pub fn drain_written(&self) -> Vec<Vec<u8>> {
        self.rx.try_iter().collect()
    }

    /// Make the next `count` host writes fail with an I/O error.
    pub fn fail_next_writes(&self, count: u32) {
        self.transport.failing_writes.store(count, Ordering::SeqCst);
    }

    /// Whether the host has closed the transport.
    pub fn is_closed(&self) -> bool {
        !self.transport.is_open()
    }
}

/// Connector handing out a prepared [`MemoryTransport`].
///
/// Every `open` reopens and returns the same transport, so a link can be
/// connected, disconnected and connected again against one device. An
/// unavailable connector fails every `open` like a missing serial device.
pub struct MemoryConnector {
    transport: Option<Arc<MemoryTransport>>,
    opened: Mutex<Vec<SerialSettings>>,
}

impl MemoryConnector {
    /// Connector that opens `transport`.
    pub fn new(transport: Arc<MemoryTransport>) -> Self {
        Self {
            transport: Some(transport),
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Connector whose device is never present.
    pub fn unavailable() -> Self {
        Self {
            transport: None,
            opened: Mutex::new(Vec::new()),
        }
    }

    /// Settings of every successful `open`, oldest first.
    pub fn opened(&self) -> Vec<SerialSettings> {
        self.opened.lock().clone()
    }
}

impl Connector for MemoryConnector {
    fn open(&self, settings: &SerialSettings) -> Result<Arc<dyn Transport>, TransportError> {
        let transport = self.transport.as_ref().ok_or_else(|| TransportError::Open {
            port: settings.port.clone(),
            source: serialport::Error::new(serialport::ErrorKind::NoDevice, "device not present"),
        })?;
        transport.reopen();
        self.opened.lock().push(settings.clone());
        Ok(Arc::clone(transport) as Arc<dyn Transport>)
    }
}
