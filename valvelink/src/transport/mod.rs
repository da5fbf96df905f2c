//! Physical transport to the rig controller.
//!
//! The link manager never talks to a serial device directly. It goes through
//! the [`Transport`] trait, which exposes exactly the three operations the
//! reader and writer loops need:
//!
//! - `read_line` - blocking line read bounded by the read timeout
//! - `write_raw` - raw byte write
//! - `close` - idempotent shutdown, callable from any thread
//!
//! Transports are created by a [`Connector`], so the link can be driven by a
//! real serial port ([`SerialConnector`]) or a scripted in-memory device
//! ([`MemoryConnector`]) without changing any loop code.
//!
//! # Threading
//!
//! A transport is shared as `Arc<dyn Transport>` between exactly one reader
//! thread and one writer thread. Implementations keep the read and write
//! halves independent so a blocked read never delays a write.

mod memory;
mod serial;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use memory::{MemoryConnector, MemoryDevice, MemoryTransport};
pub use serial::{SerialConnector, SerialTransport};

/// Default serial baud rate of the rig controller firmware.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default per-line read timeout.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Default write timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_millis(100);

/// Longest partial line buffered while waiting for a terminator.
///
/// A device that never sends a newline would otherwise grow the buffer
/// without bound. Once reached, the buffered bytes are handed out as a line.
pub const MAX_LINE_LEN: usize = 4096;

/// Errors produced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The device could not be opened or configured.
    #[error("Failed to open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    /// Hard I/O failure while reading or writing.
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has been closed.
    #[error("Transport is closed")]
    Closed,
}

/// Parameters needed to open a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`.
    pub port: String,
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Upper bound for a single `read_line` call.
    pub read_timeout: Duration,
    /// Upper bound for a single `write_raw` call.
    pub write_timeout: Duration,
}

impl SerialSettings {
    /// Settings for `port` with default speed and timeouts.
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    /// Set the baud rate.
    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    /// Set the read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the write timeout.
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }
}

/// Line-oriented byte transport to the device.
pub trait Transport: Send + Sync {
    /// Read one line, blocking up to the read timeout.
    ///
    /// Returns `Ok(None)` on timeout. The returned bytes keep the trailing
    /// terminator. Only hard failures and reads on a closed transport are
    /// errors.
    fn read_line(&self) -> Result<Option<Vec<u8>>, TransportError>;

    /// Write `bytes` in full.
    fn write_raw(&self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Close the device. Idempotent.
    fn close(&self);

    /// Whether `close` has not been called yet.
    fn is_open(&self) -> bool;
}

/// Factory that opens transports for a connection attempt.
pub trait Connector: Send + Sync {
    /// Open and configure the device described by `settings`.
    fn open(&self, settings: &SerialSettings) -> Result<Arc<dyn Transport>, TransportError>;
}
