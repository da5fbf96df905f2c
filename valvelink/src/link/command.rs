//! Outbound operator commands and the queue that carries them.

use crossbeam_channel::{Sender, TrySendError};

use super::LinkError;

/// Command bound for the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Bytes written exactly as given.
    Raw(Vec<u8>),
    /// Text line; a newline is appended when missing.
    Text(String),
}

impl Command {
    pub fn text(text: impl Into<String>) -> Self {
        Command::Text(text.into())
    }

    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Command::Raw(bytes.into())
    }

    /// Wire encoding of the command.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Command::Raw(bytes) => bytes,
            Command::Text(mut text) => {
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                text.into_bytes()
            }
        }
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Command::Text(text.to_string())
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Command::Text(text)
    }
}

impl From<Vec<u8>> for Command {
    fn from(bytes: Vec<u8>) -> Self {
        Command::Raw(bytes)
    }
}

impl From<&[u8]> for Command {
    fn from(bytes: &[u8]) -> Self {
        Command::Raw(bytes.to_vec())
    }
}

/// Capacity policy of the outbound command queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutboundCapacity {
    /// No bound. Commands queued while the device is slow or disconnected
    /// accumulate in memory until written.
    #[default]
    Unbounded,
    /// At most this many pending commands; further sends are rejected with
    /// [`LinkError::OutboundFull`] instead of blocking the caller.
    Bounded(usize),
}

impl OutboundCapacity {
    pub(crate) fn channel<T>(self) -> (Sender<T>, crossbeam_channel::Receiver<T>) {
        match self {
            OutboundCapacity::Unbounded => crossbeam_channel::unbounded(),
            OutboundCapacity::Bounded(capacity) => crossbeam_channel::bounded(capacity.max(1)),
        }
    }
}

/// Cloneable handle for queueing commands from any thread.
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<Command>,
    capacity: OutboundCapacity,
}

impl CommandSender {
    pub(crate) fn new(tx: Sender<Command>, capacity: OutboundCapacity) -> Self {
        Self { tx, capacity }
    }

    /// Queue a command for the writer. Never blocks.
    pub fn send(&self, command: impl Into<Command>) -> Result<(), LinkError> {
        self.tx.try_send(command.into()).map_err(|e| match e {
            TrySendError::Full(_) => LinkError::OutboundFull {
                capacity: match self.capacity {
                    OutboundCapacity::Bounded(capacity) => capacity,
                    OutboundCapacity::Unbounded => usize::MAX,
                },
            },
            TrySendError::Disconnected(_) => LinkError::OutboundClosed,
        })
    }

    /// Commands waiting to be written.
    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_gets_single_newline() {
        assert_eq!(Command::text("A").into_bytes(), b"A\n");
        assert_eq!(Command::text("B\n").into_bytes(), b"B\n");
        assert_eq!(Command::text("").into_bytes(), b"\n");
    }

    #[test]
    fn test_raw_is_untouched() {
        assert_eq!(Command::raw(b"ignseq 15".to_vec()).into_bytes(), b"ignseq 15");
        assert_eq!(Command::raw(vec![0x00, 0xff]).into_bytes(), vec![0x00, 0xff]);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Command::from("x"), Command::Text("x".to_string()));
        assert_eq!(Command::from(String::from("y")), Command::Text("y".to_string()));
        assert_eq!(Command::from(vec![1u8]), Command::Raw(vec![1]));
        assert_eq!(Command::from(&b"z"[..]), Command::Raw(b"z".to_vec()));
    }

    #[test]
    fn test_sender_preserves_order() {
        let (tx, rx) = OutboundCapacity::Unbounded.channel();
        let sender = CommandSender::new(tx, OutboundCapacity::Unbounded);
        for text in ["A", "B", "C"] {
            sender.send(text).unwrap();
        }
        assert_eq!(sender.pending(), 3);
        let sent: Vec<Command> = rx.try_iter().collect();
        assert_eq!(
            sent,
            vec![Command::text("A"), Command::text("B"), Command::text("C")]
        );
    }

    #[test]
    fn test_bounded_sender_rejects_when_full() {
        let capacity = OutboundCapacity::Bounded(2);
        let (tx, _rx) = capacity.channel();
        let sender = CommandSender::new(tx, capacity);
        sender.send("1").unwrap();
        sender.send("2").unwrap();
        assert!(matches!(
            sender.send("3"),
            Err(LinkError::OutboundFull { capacity: 2 })
        ));
    }

    #[test]
    fn test_sender_reports_closed_queue() {
        let (tx, rx) = OutboundCapacity::Unbounded.channel();
        drop(rx);
        let sender = CommandSender::new(tx, OutboundCapacity::Unbounded);
        assert!(matches!(sender.send("x"), Err(LinkError::OutboundClosed)));
    }
}
