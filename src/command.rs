//! Outbound commands and their text encoding
//!
//! Wire format is one text frame per command:
//! - `CHAT <text>`
//! - `DISCONNECT`
//!
//! Payloads are not escaped.

use crate::error::ChannelError;
use std::fmt;

const CHAT_PREFIX: &str = "CHAT ";
const DISCONNECT: &str = "DISCONNECT";

/// A single instruction for the remote endpoint
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Chat(String),
    Disconnect,
}

impl Command {
    /// Build a chat command, rejecting blank input
    pub fn chat(payload: impl Into<String>) -> Result<Self, ChannelError> {
        let payload = payload.into();
        if payload.trim().is_empty() {
            return Err(ChannelError::MalformedCommand);
        }
        Ok(Command::Chat(payload))
    }

    /// Encode to the literal sent on the wire
    ///
    /// `Command::Chat` can be built directly, so validation is repeated here.
    pub fn encode(&self) -> Result<String, ChannelError> {
        match self {
            Command::Chat(payload) if payload.trim().is_empty() => {
                Err(ChannelError::MalformedCommand)
            }
            Command::Chat(payload) => Ok(format!("{CHAT_PREFIX}{payload}")),
            Command::Disconnect => Ok(DISCONNECT.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Command::Chat(_) => "chat",
            Command::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Chat(payload) => write!(f, "{CHAT_PREFIX}{payload}"),
            Command::Disconnect => f.write_str(DISCONNECT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_encodes_with_prefix() {
        let cmd = Command::chat("hello").unwrap();
        assert_eq!(cmd.encode().unwrap(), "CHAT hello");
    }

    #[test]
    fn chat_payload_is_sent_verbatim() {
        let cmd = Command::chat("  spaced out ").unwrap();
        assert_eq!(cmd.encode().unwrap(), "CHAT   spaced out ");
    }

    #[test]
    fn payload_containing_prefix_is_not_escaped() {
        let cmd = Command::chat("CHAT DISCONNECT").unwrap();
        assert_eq!(cmd.encode().unwrap(), "CHAT CHAT DISCONNECT");
    }

    #[test]
    fn disconnect_encodes_bare() {
        assert_eq!(Command::Disconnect.encode().unwrap(), "DISCONNECT");
    }

    #[test]
    fn blank_chat_rejected() {
        assert_eq!(Command::chat(""), Err(ChannelError::MalformedCommand));
        assert_eq!(Command::chat(" \t\n"), Err(ChannelError::MalformedCommand));
        // Bypassing the constructor still cannot put a blank chat on the wire
        assert_eq!(
            Command::Chat("   ".into()).encode(),
            Err(ChannelError::MalformedCommand)
        );
    }
}
