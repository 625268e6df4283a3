//! Browser WebSocket transport for the command channel

use crate::error::ChannelError;
use crate::transport::{Connector, Transport, TransportEvent};
use std::rc::Rc;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

/// Where socket callbacks deliver their notifications
pub type Dispatch = Rc<dyn Fn(TransportEvent)>;

/// Opens browser WebSockets whose callbacks feed `dispatch`
pub struct BrowserConnector {
    dispatch: Dispatch,
}

impl BrowserConnector {
    pub fn new(dispatch: impl Fn(TransportEvent) + 'static) -> Self {
        Self {
            dispatch: Rc::new(dispatch),
        }
    }
}

impl Connector for BrowserConnector {
    type Transport = WsClient;

    fn connect(&mut self, endpoint: &str) -> Result<WsClient, ChannelError> {
        WsClient::connect(endpoint, self.dispatch.clone()).map_err(|e| ChannelError::Connect {
            endpoint: endpoint.to_string(),
            reason: format!("{e:?}"),
        })
    }
}

/// WASM WebSocket client
pub struct WsClient {
    ws: WebSocket,
}

impl WsClient {
    /// Connect to a WebSocket endpoint
    ///
    /// Callbacks fire on later event-loop turns, never from inside this call.
    pub fn connect(url: &str, dispatch: Dispatch) -> Result<Self, JsValue> {
        info!(url, "Connecting to WebSocket");

        let ws = WebSocket::new(url)?;

        let d = dispatch.clone();
        let on_open = Closure::wrap(Box::new(move |_| {
            info!("WebSocket connected");
            d(TransportEvent::Opened);
        }) as Box<dyn Fn(JsValue)>);
        ws.set_onopen(Some(on_open.as_ref().unchecked_ref()));
        on_open.forget();

        let d = dispatch.clone();
        let on_msg = Closure::wrap(Box::new(move |e: MessageEvent| {
            match e.data().dyn_into::<js_sys::JsString>() {
                Ok(txt) => d(TransportEvent::Message(txt.into())),
                Err(_) => debug!("Ignoring non-text frame"),
            }
        }) as Box<dyn Fn(MessageEvent)>);
        ws.set_onmessage(Some(on_msg.as_ref().unchecked_ref()));
        on_msg.forget();

        // Browsers hand WebSocket errors over as a plain Event with no detail
        let d = dispatch.clone();
        let on_err = Closure::wrap(Box::new(move |e: Event| {
            d(TransportEvent::Errored(format!("websocket {}", e.type_())));
        }) as Box<dyn Fn(Event)>);
        ws.set_onerror(Some(on_err.as_ref().unchecked_ref()));
        on_err.forget();

        let d = dispatch;
        let on_close = Closure::wrap(Box::new(move |e: CloseEvent| {
            let code = e.code();
            let reason = e.reason();
            warn!(code, reason = %reason, "WebSocket closed");
            d(TransportEvent::Closed);
        }) as Box<dyn Fn(CloseEvent)>);
        ws.set_onclose(Some(on_close.as_ref().unchecked_ref()));
        on_close.forget();

        Ok(Self { ws })
    }
}

impl Transport for WsClient {
    fn send_text(&mut self, text: &str) -> Result<(), ChannelError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| ChannelError::Transport(format!("{e:?}")))
    }

    fn close(&mut self) {
        if let Err(e) = self.ws.close() {
            error!(?e, "Failed to close WebSocket");
        }
    }
}
