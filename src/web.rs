//! Browser chat page
//!
//! Wires the page controls to a `CommandChannel`:
//! - `#send-chat` sends the contents of `#chat-input` as a chat command
//! - `#disconnect-btn` says goodbye and closes the connection
//!
//! Both buttons are enabled only while the connection is open.

use crate::channel::CommandChannel;
use crate::command::Command;
use crate::config::ClientConfig;
use crate::websocket_wasm::{BrowserConnector, WsClient};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, error};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlButtonElement, HtmlInputElement};

const DISCONNECTED_NOTICE: &str = "You have been disconnected from the server.";

type SharedChannel = Rc<RefCell<CommandChannel<WsClient>>>;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    // Initialize tracing for browser console
    tracing_wasm::set_as_global_default();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let send_btn: HtmlButtonElement = element(&document, "send-chat")?;
    let disconnect_btn: HtmlButtonElement = element(&document, "disconnect-btn")?;
    let input: HtmlInputElement = element(&document, "chat-input")?;

    send_btn.set_disabled(true);
    disconnect_btn.set_disabled(true);

    let channel: SharedChannel = Rc::new(RefCell::new(CommandChannel::new(
        ClientConfig::default().endpoint,
    )));

    {
        let send_btn = send_btn.clone();
        let disconnect_btn = disconnect_btn.clone();
        channel.borrow_mut().on_state_change(move |state| {
            let disabled = !state.is_open();
            send_btn.set_disabled(disabled);
            disconnect_btn.set_disabled(disabled);
        });
    }

    let weak = Rc::downgrade(&channel);
    let mut connector = BrowserConnector::new(move |event| {
        let Some(channel) = weak.upgrade() else {
            return;
        };
        match channel.try_borrow_mut() {
            Ok(mut channel) => channel.handle_event(event),
            Err(_) => error!(?event, "Channel busy, dropping transport event"),
        };
    });
    // A failed start is already logged and leaves the channel closed
    let _ = channel.borrow_mut().open(&mut connector);

    let ch = channel.clone();
    let chat_input = input.clone();
    let on_send = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let result = Command::chat(chat_input.value()).and_then(|cmd| ch.borrow_mut().send(cmd));
        match result {
            Ok(()) => chat_input.set_value(""),
            Err(e) => debug!(error = %e, "Chat not sent"),
        }
    }) as Box<dyn Fn(web_sys::Event)>);
    send_btn.add_event_listener_with_callback("click", on_send.as_ref().unchecked_ref())?;
    on_send.forget();

    let ch = channel;
    let on_disconnect = Closure::wrap(Box::new(move |_: web_sys::Event| {
        let result = ch.borrow_mut().disconnect();
        if result.is_ok() {
            if let Err(e) = window.alert_with_message(DISCONNECTED_NOTICE) {
                error!(?e, "Failed to show alert");
            }
        }
    }) as Box<dyn Fn(web_sys::Event)>);
    disconnect_btn
        .add_event_listener_with_callback("click", on_disconnect.as_ref().unchecked_ref())?;
    on_disconnect.forget();

    Ok(())
}

fn element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no #{id} element")))?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("#{id} has the wrong element type")))
}
