//! Connection lifecycle state
//!
//! Shared by the command channel and both WebSocket transports.

use std::fmt;

/// Lifecycle of the single connection owned by a `CommandChannel`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WsState {
    #[default]
    Connecting,
    Open,
    Closing,
    Closed,
}

impl WsState {
    /// Commands may only be transmitted in this state
    pub fn is_open(&self) -> bool {
        matches!(self, WsState::Open)
    }

    /// Closed is terminal; there is no reconnect edge
    pub fn is_terminal(&self) -> bool {
        matches!(self, WsState::Closed)
    }

    /// Whether `next` is a legal edge from `self`
    pub fn can_transition_to(&self, next: WsState) -> bool {
        use WsState::*;
        matches!(
            (self, next),
            (Connecting, Open)
                | (Connecting, Closed)
                | (Open, Closing)
                | (Open, Closed)
                | (Closing, Closed)
        )
    }
}

impl fmt::Display for WsState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WsState::Connecting => "connecting",
            WsState::Open => "open",
            WsState::Closing => "closing",
            WsState::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [WsState; 4] = [
        WsState::Connecting,
        WsState::Open,
        WsState::Closing,
        WsState::Closed,
    ];

    #[test]
    fn closed_has_no_outgoing_edges() {
        for next in ALL {
            assert!(!WsState::Closed.can_transition_to(next), "closed -> {}", next);
        }
    }

    #[test]
    fn closing_only_reachable_from_open() {
        for from in ALL {
            let allowed = from.can_transition_to(WsState::Closing);
            assert_eq!(allowed, from == WsState::Open, "{} -> closing", from);
        }
    }

    #[test]
    fn every_live_state_can_close() {
        for from in [WsState::Connecting, WsState::Open, WsState::Closing] {
            assert!(from.can_transition_to(WsState::Closed));
        }
    }

    #[test]
    fn only_open_accepts_commands() {
        assert!(WsState::Open.is_open());
        assert!(!WsState::Connecting.is_open());
        assert!(!WsState::Closing.is_open());
        assert!(!WsState::Closed.is_open());
    }
}
