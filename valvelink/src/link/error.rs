use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by [`SerialLink`](super::SerialLink).
///
/// Only connection setup and command submission report errors to the caller.
/// Failures inside the running reader and writer loops are logged and handled
/// there.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The transport could not be opened or configured.
    #[error("Connection failed: {0}")]
    Connect(#[source] TransportError),

    /// The telemetry record file could not be opened.
    #[error("Failed to open telemetry record file: {0}")]
    Recorder(#[source] std::io::Error),

    /// A background loop thread could not be started.
    #[error("Failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The bounded outbound queue has no room.
    #[error("Outbound command queue is full ({capacity} pending)")]
    OutboundFull { capacity: usize },

    /// The outbound queue has no consumer left.
    #[error("Outbound command queue is closed")]
    OutboundClosed,
}
