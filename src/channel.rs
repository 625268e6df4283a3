//! Lifecycle-gated command channel
//!
//! Owns exactly one connection and only lets commands through while it is open.
//! The transport drives the state machine by feeding `TransportEvent`s into
//! [`CommandChannel::handle_event`]; everything runs on one logical thread.

use crate::command::Command;
use crate::error::ChannelError;
use crate::transport::{Connector, Transport, TransportEvent};
use crate::ws_state::WsState;
use tracing::{debug, error, info, trace, warn};

type StateHandler = Box<dyn FnMut(WsState)>;
type TextHandler = Box<dyn FnMut(&str)>;

pub struct CommandChannel<T: Transport> {
    endpoint: String,
    state: WsState,
    /// None until `open()` succeeds, and again once closed
    transport: Option<T>,
    started: bool,
    state_handlers: Vec<StateHandler>,
    message_handlers: Vec<TextHandler>,
    error_handlers: Vec<TextHandler>,
}

impl<T: Transport> CommandChannel<T> {
    /// Create a channel for `endpoint` in the `Connecting` state
    ///
    /// Register handlers, then call [`open`](Self::open) to begin establishment.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            state: WsState::Connecting,
            transport: None,
            started: false,
            state_handlers: Vec::new(),
            message_handlers: Vec::new(),
            error_handlers: Vec::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> WsState {
        self.state
    }

    /// Begin establishment; returns without waiting for the handshake
    ///
    /// A connector that fails up front is reported the same way a transport
    /// would report it: an error notification followed by a close.
    pub fn open<C>(&mut self, connector: &mut C) -> Result<(), ChannelError>
    where
        C: Connector<Transport = T>,
    {
        if self.started {
            warn!(endpoint = %self.endpoint, state = %self.state, "Channel already opened, ignoring");
            return Ok(());
        }
        self.started = true;

        info!(endpoint = %self.endpoint, "Connecting");
        match connector.connect(&self.endpoint) {
            Ok(transport) => {
                self.transport = Some(transport);
                Ok(())
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "Failed to start connection");
                self.handle_event(TransportEvent::Errored(e.to_string()));
                self.handle_event(TransportEvent::Closed);
                Err(e)
            }
        }
    }

    /// Called with every new state, synchronously, in transition order
    pub fn on_state_change(&mut self, handler: impl FnMut(WsState) + 'static) {
        self.state_handlers.push(Box::new(handler));
    }

    /// Called with every inbound text payload, in arrival order
    pub fn on_message(&mut self, handler: impl FnMut(&str) + 'static) {
        self.message_handlers.push(Box::new(handler));
    }

    /// Called with the description of every transport error
    pub fn on_error(&mut self, handler: impl FnMut(&str) + 'static) {
        self.error_handlers.push(Box::new(handler));
    }

    /// Transmit a command if the connection is open
    ///
    /// Rejections are logged and returned; nothing is transmitted for them.
    /// `Command::Disconnect` also moves the channel to `Closing` and asks the
    /// transport to close.
    pub fn send(&mut self, command: Command) -> Result<(), ChannelError> {
        if !self.state.is_open() {
            warn!(command = command.kind(), state = %self.state, "WebSocket is not open, command dropped");
            return Err(ChannelError::NotConnected { state: self.state });
        }

        let text = command.encode().map_err(|e| {
            warn!(command = command.kind(), error = %e, "Rejected command");
            e
        })?;

        let Some(transport) = self.transport.as_mut() else {
            warn!(state = %self.state, "Open channel without a transport");
            return Err(ChannelError::NotConnected { state: self.state });
        };

        let sent = transport.send_text(&text);
        match &sent {
            Ok(()) => debug!(text, "Command sent"),
            Err(e) => {
                error!(command = command.kind(), error = %e, "Failed to send command");
                self.report_error(&e.to_string());
            }
        }

        // The local side wants out even if the farewell did not make it
        if command == Command::Disconnect {
            self.transition(WsState::Closing);
            if let Some(transport) = self.transport.as_mut() {
                transport.close();
            }
        }

        sent
    }

    /// Send `DISCONNECT` and close; the caller learns of `Closed` via `on_state_change`
    pub fn disconnect(&mut self) -> Result<(), ChannelError> {
        self.send(Command::Disconnect)
    }

    /// Apply one notification from the transport
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => {
                if self.state == WsState::Connecting {
                    info!(endpoint = %self.endpoint, "WebSocket connection established");
                    self.transition(WsState::Open);
                } else {
                    warn!(state = %self.state, "Ignoring open notification");
                }
            }
            TransportEvent::Closed => {
                if self.state.is_terminal() {
                    trace!("Duplicate close notification");
                    return;
                }
                info!(endpoint = %self.endpoint, "WebSocket connection closed");
                self.transition(WsState::Closed);
                self.transport = None;
            }
            TransportEvent::Errored(description) => {
                // Does not close by itself; a separate Closed event does that
                error!(error = %description, state = %self.state, "WebSocket error");
                self.report_error(&description);
            }
            TransportEvent::Message(text) => {
                if self.state.is_terminal() {
                    trace!(len = text.len(), "Dropping message received after close");
                    return;
                }
                info!(message = %text, "Message received");
                for handler in &mut self.message_handlers {
                    handler(&text);
                }
            }
        }
    }

    fn transition(&mut self, next: WsState) {
        if !self.state.can_transition_to(next) {
            warn!(from = %self.state, to = %next, "Illegal state transition ignored");
            return;
        }
        debug!(from = %self.state, to = %next, "State change");
        self.state = next;
        for handler in &mut self.state_handlers {
            handler(next);
        }
    }

    fn report_error(&mut self, description: &str) {
        for handler in &mut self.error_handlers {
            handler(description);
        }
    }
}
