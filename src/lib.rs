//! Chat command channel
//!
//! One WebSocket connection to a chat server, gated on its lifecycle:
//! - `CHAT <text>` and `DISCONNECT` commands go out only while the connection is open
//! - state changes, inbound text and transport errors are reported to registered handlers
//!
//! Native builds (`cli` feature) run the socket on tokio-tungstenite; browser
//! builds (`wasm` feature) use `web_sys::WebSocket` and drive the chat page.

pub mod channel;
pub mod command;
pub mod config;
pub mod error;
pub mod transport;
pub mod ws_state;

#[cfg(all(feature = "cli", not(target_arch = "wasm32")))]
pub mod websocket_native;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod websocket_wasm;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
mod web;

pub use channel::CommandChannel;
pub use command::Command;
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use error::ChannelError;
pub use transport::{Connector, Transport, TransportEvent};
pub use ws_state::WsState;

#[cfg(all(feature = "cli", not(target_arch = "wasm32")))]
pub use websocket_native::{NativeConnector, NativeWsClient};
