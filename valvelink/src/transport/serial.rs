//! Serial port transport backed by the `serialport` crate.

use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serialport::SerialPort;
use tracing::{debug, info};

use super::{Connector, SerialSettings, Transport, TransportError, MAX_LINE_LEN};

/// Bytes requested from the device per read call.
const READ_CHUNK: usize = 256;

/// Bytes received past the last line terminator.
#[derive(Debug)]
struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    fn new() -> Self {
        Self {
            pending: Vec::with_capacity(READ_CHUNK),
        }
    }

    fn extend(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Split one complete line, terminator included, off the front.
    ///
    /// Once `MAX_LINE_LEN` bytes are pending without a `\n`, they are handed
    /// out as one line so a device that never terminates cannot grow the
    /// buffer without bound.
    fn take_line(&mut self) -> Option<Vec<u8>> {
        if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(pos + 1);
            return Some(std::mem::replace(&mut self.pending, rest));
        }
        if self.pending.len() >= MAX_LINE_LEN {
            return Some(std::mem::take(&mut self.pending));
        }
        None
    }
}

/// Read from `source` until `buffer` yields a line or `deadline` passes.
///
/// A timed-out read and a zero-byte read both end the call with `None`.
fn fill_line<R: Read + ?Sized>(
    source: &mut R,
    buffer: &mut LineBuffer,
    deadline: Instant,
) -> io::Result<Option<Vec<u8>>> {
    if let Some(line) = buffer.take_line() {
        return Ok(Some(line));
    }

    let mut chunk = [0u8; READ_CHUNK];
    loop {
        match source.read(&mut chunk) {
            Ok(0) => return Ok(None),
            Ok(n) => {
                buffer.extend(&chunk[..n]);
                if let Some(line) = buffer.take_line() {
                    return Ok(Some(line));
                }
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(None),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }

        // Bytes trickling in without a terminator must not stretch one
        // call past the configured timeout.
        if Instant::now() >= deadline {
            return Ok(None);
        }
    }
}

/// Read half: the port handle plus its line buffer.
struct LineReader {
    port: Box<dyn SerialPort>,
    buffer: LineBuffer,
}

/// Serial device opened through `serialport`.
///
/// The port is cloned into independent read and write handles so that the
/// reader thread blocking in `read_line` never holds up the writer thread.
/// Each half sits behind its own lock, which `close` takes to drop the handle.
pub struct SerialTransport {
    port_name: String,
    reader: Mutex<Option<LineReader>>,
    writer: Mutex<Option<Box<dyn SerialPort>>>,
    open: AtomicBool,
}

impl SerialTransport {
    /// Open and configure the device.
    pub fn open(settings: &SerialSettings) -> Result<Self, TransportError> {
        let open_error = |source| TransportError::Open {
            port: settings.port.clone(),
            source,
        };

        let port = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(settings.read_timeout)
            .open()
            .map_err(open_error)?;

        let mut write_port = port.try_clone().map_err(open_error)?;
        write_port
            .set_timeout(settings.write_timeout)
            .map_err(open_error)?;

        info!(
            port = %settings.port,
            baud = settings.baud_rate,
            read_timeout_ms = settings.read_timeout.as_millis() as u64,
            "Opened serial port"
        );

        Ok(Self {
            port_name: settings.port.clone(),
            reader: Mutex::new(Some(LineReader {
                port,
                buffer: LineBuffer::new(),
            })),
            writer: Mutex::new(Some(write_port)),
            open: AtomicBool::new(true),
        })
    }
}

impl Transport for SerialTransport {
    fn read_line(&self) -> Result<Option<Vec<u8>>, TransportError> {
        let mut guard = self.reader.lock();
        let reader = guard.as_mut().ok_or(TransportError::Closed)?;
        let deadline = Instant::now() + reader.port.timeout();
        fill_line(reader.port.as_mut(), &mut reader.buffer, deadline).map_err(TransportError::from)
    }

    fn write_raw(&self, bytes: &[u8]) -> Result<(), TransportError> {
        let mut guard = self.writer.lock();
        let port = guard.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(bytes)?;
        port.flush()?;
        Ok(())
    }

    fn close(&self) {
        if !self.open.swap(false, Ordering::SeqCst) {
            return;
        }
        // The writer lock is short-lived; the reader lock may be held for up
        // to one read timeout by an in-flight read.
        self.writer.lock().take();
        self.reader.lock().take();
        debug!(port = %self.port_name, "Closed serial port");
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

/// Connector that opens real serial devices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    fn open(&self, settings: &SerialSettings) -> Result<Arc<dyn Transport>, TransportError> {
        Ok(Arc::new(SerialTransport::open(settings)?))
    }
}
