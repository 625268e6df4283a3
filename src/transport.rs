//! Transport provider interface consumed by the command channel
//!
//! Implemented by the tokio-tungstenite client (`cli`) and the browser
//! WebSocket client (`wasm`), and by recording stubs in tests.

use crate::error::ChannelError;

/// Notification delivered by a transport, in the order it observed them
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Closed,
    /// Reported on its own; a close, if any, arrives as a separate event
    Errored(String),
    Message(String),
}

/// An established (or establishing) connection handle
pub trait Transport {
    /// Transmit one text frame
    fn send_text(&mut self, text: &str) -> Result<(), ChannelError>;

    /// Ask the transport to close; completion arrives as `TransportEvent::Closed`
    fn close(&mut self);
}

/// Starts establishment of a new transport
pub trait Connector {
    type Transport: Transport;

    /// Must return without waiting for the handshake
    fn connect(&mut self, endpoint: &str) -> Result<Self::Transport, ChannelError>;
}
