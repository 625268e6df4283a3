//! Errors reported at the command channel boundary
//!
//! None of these are fatal: the channel logs them and hands them back as values.

use crate::ws_state::WsState;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// A command was issued while the connection was not open
    #[error("connection is {state}, not open")]
    NotConnected { state: WsState },

    /// The transport reported a failure
    #[error("transport error: {0}")]
    Transport(String),

    /// Chat payload was empty or whitespace-only
    #[error("chat payload is empty")]
    MalformedCommand,

    /// The connector could not even begin establishment
    #[error("failed to connect to {endpoint}: {reason}")]
    Connect { endpoint: String, reason: String },
}
