//! Native WebSocket transport for the command channel
//!
//! Uses tokio-tungstenite on a spawned task, with channel-based message passing:
//! commands go in through an unbounded queue, lifecycle notifications come back
//! out through another, in the order the socket produced them.

use crate::error::ChannelError;
use crate::transport::{Connector, Transport, TransportEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

/// Requests from the channel to the socket task
#[derive(Debug)]
enum Outbound {
    Text(String),
    Close,
}

/// Spawns socket tasks on the current tokio runtime
pub struct NativeConnector {
    events: UnboundedSender<TransportEvent>,
}

impl NativeConnector {
    /// Returns the connector and the receiver its transports report into
    pub fn new() -> (Self, UnboundedReceiver<TransportEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }
}

impl Connector for NativeConnector {
    type Transport = NativeWsClient;

    fn connect(&mut self, endpoint: &str) -> Result<NativeWsClient, ChannelError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| ChannelError::Connect {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        handle.spawn(run_websocket(endpoint.to_string(), rx, self.events.clone()));
        Ok(NativeWsClient { tx })
    }
}

/// Handle to a socket task; dropping it closes the connection
pub struct NativeWsClient {
    tx: UnboundedSender<Outbound>,
}

impl Transport for NativeWsClient {
    fn send_text(&mut self, text: &str) -> Result<(), ChannelError> {
        self.tx
            .send(Outbound::Text(text.to_string()))
            .map_err(|_| ChannelError::Transport("connection task has exited".into()))
    }

    fn close(&mut self) {
        if self.tx.send(Outbound::Close).is_err() {
            debug!("Close requested after connection task exited");
        }
    }
}

async fn run_websocket(
    url: String,
    mut outbound: UnboundedReceiver<Outbound>,
    events: UnboundedSender<TransportEvent>,
) {
    use futures_util::{SinkExt, StreamExt};
    use tokio_tungstenite::{connect_async, tungstenite::Message};

    // Receiver gone means nobody is listening any more; nothing to do about it
    let emit = |event: TransportEvent| {
        let _ = events.send(event);
    };

    info!(url = %url, "Connecting to WebSocket");

    let ws_stream = match connect_async(url.as_str()).await {
        Ok((stream, _)) => {
            info!("WebSocket connected");
            emit(TransportEvent::Opened);
            stream
        }
        Err(e) => {
            error!(error = %e, "Failed to connect");
            emit(TransportEvent::Errored(e.to_string()));
            emit(TransportEvent::Closed);
            return;
        }
    };

    let (mut write, mut read) = ws_stream.split();
    let mut closing = false;

    loop {
        tokio::select! {
            cmd = outbound.recv(), if !closing => {
                match cmd {
                    Some(Outbound::Text(text)) => {
                        if let Err(e) = write.send(Message::Text(text)).await {
                            error!(error = %e, "Failed to send frame");
                            emit(TransportEvent::Errored(e.to_string()));
                        }
                    }
                    Some(Outbound::Close) | None => {
                        debug!("Starting close handshake");
                        closing = true;
                        if let Err(e) = write.close().await {
                            warn!(error = %e, "Close handshake failed");
                        }
                    }
                }
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => emit(TransportEvent::Message(text.to_string())),
                    Some(Ok(Message::Close(frame))) => {
                        // tungstenite answers the close frame; the stream ends after that
                        warn!(?frame, "WebSocket closed by server");
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!(error = %e, "WebSocket error");
                        emit(TransportEvent::Errored(e.to_string()));
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    info!("WebSocket stream ended");
    emit(TransportEvent::Closed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::CommandChannel;
    use crate::command::Command;
    use crate::ws_state::WsState;
    use futures_util::{SinkExt, StreamExt};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio_tungstenite::tungstenite::Message;

    const TIMEOUT: Duration = Duration::from_secs(5);

    async fn collect_events(mut rx: UnboundedReceiver<TransportEvent>) -> Vec<TransportEvent> {
        let mut seen = Vec::new();
        while let Some(event) = rx.recv().await {
            let done = event == TransportEvent::Closed;
            seen.push(event);
            if done {
                break;
            }
        }
        seen
    }

    #[tokio::test]
    async fn chat_session_against_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::Text("welcome".into())).await.unwrap();
            let mut received = Vec::new();
            while let Some(Ok(msg)) = ws.next().await {
                if let Message::Text(text) = msg {
                    received.push(text.to_string());
                }
            }
            received
        });

        let (mut connector, mut events) = NativeConnector::new();
        let mut channel = CommandChannel::new(format!("ws://{addr}"));
        let inbound = Rc::new(RefCell::new(Vec::new()));
        let sink = inbound.clone();
        channel.on_message(move |text| sink.borrow_mut().push(text.to_string()));
        channel.open(&mut connector).unwrap();

        tokio::time::timeout(TIMEOUT, async {
            while let Some(event) = events.recv().await {
                let opened = event == TransportEvent::Opened;
                channel.handle_event(event);
                if opened {
                    channel.send(Command::chat("hello").unwrap()).unwrap();
                }
                if channel.state().is_open() && !inbound.borrow().is_empty() {
                    channel.disconnect().unwrap();
                }
                if channel.state().is_terminal() {
                    break;
                }
            }
        })
        .await
        .expect("session timed out");

        assert_eq!(channel.state(), WsState::Closed);
        assert_eq!(*inbound.borrow(), vec!["welcome"]);

        let received = tokio::time::timeout(TIMEOUT, server).await.unwrap().unwrap();
        assert_eq!(received, vec!["CHAT hello", "DISCONNECT"]);
    }

    #[tokio::test]
    async fn refused_connection_reports_error_then_close() {
        // Grab a free port, then release it so nothing is listening
        let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

        let (mut connector, events) = NativeConnector::new();
        let _client = connector.connect(&format!("ws://{addr}")).unwrap();

        let seen = tokio::time::timeout(TIMEOUT, collect_events(events)).await.unwrap();
        assert_eq!(seen.len(), 2, "{seen:?}");
        assert!(matches!(seen[0], TransportEvent::Errored(_)));
        assert_eq!(seen[1], TransportEvent::Closed);
    }

    #[tokio::test]
    async fn server_close_is_reported_without_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.close(None).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let (mut connector, events) = NativeConnector::new();
        let _client = connector.connect(&format!("ws://{addr}")).unwrap();

        let seen = tokio::time::timeout(TIMEOUT, collect_events(events)).await.unwrap();
        assert_eq!(seen, vec![TransportEvent::Opened, TransportEvent::Closed]);
    }

    #[test]
    fn connect_outside_runtime_fails_fast() {
        let (mut connector, _events) = NativeConnector::new();
        let result = connector.connect("ws://127.0.0.1:8080");
        assert!(matches!(result, Err(ChannelError::Connect { .. })));
    }
}
