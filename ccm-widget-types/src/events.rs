/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 */

//! Event names on the realtime channel and the normalized event shape
//! delivered to the embedding application.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application event names the backend emits towards the widget. The
/// transport's own `connect`, `disconnect` and `connect_error` are reported
/// by the channel layer instead.
pub mod inbound {
    pub const CHANNEL_SESSION_STARTED: &str = "CHANNEL_SESSION_STARTED";
    pub const MESSAGE_RECEIVED: &str = "MESSAGE_RECEIVED";
    pub const CHAT_ENDED: &str = "CHAT_ENDED";
    pub const ERRORS: &str = "ERRORS";

    /// Application events relayed verbatim, in subscription order.
    pub const PASS_THROUGH: [&str; 4] =
        [CHANNEL_SESSION_STARTED, MESSAGE_RECEIVED, CHAT_ENDED, ERRORS];
}

/// Event names the widget emits towards the backend.
pub mod outbound {
    pub const CHAT_REQUESTED: &str = "CHAT_REQUESTED";
    pub const VOICE_REQUESTED: &str = "VOICE_REQUESTED";
    pub const MESSAGE_RECEIVED: &str = "MESSAGE_RECEIVED";
    pub const CHAT_ENDED: &str = "CHAT_ENDED";
    pub const CHAT_RESUMED: &str = "CHAT_RESUMED";
}

/// Tag of a [`NormalizedEvent`].
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    SocketConnected,
    SocketReconnected,
    ChannelSessionStarted,
    MessageReceived,
    SocketDisconnected,
    ConnectError,
    ChatEnded,
    Errors,
    /// The SDK could not build the channel (bad URL, client setup failure).
    ConnectionError,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SocketConnected => "SOCKET_CONNECTED",
            EventKind::SocketReconnected => "SOCKET_RECONNECTED",
            EventKind::ChannelSessionStarted => "CHANNEL_SESSION_STARTED",
            EventKind::MessageReceived => "MESSAGE_RECEIVED",
            EventKind::SocketDisconnected => "SOCKET_DISCONNECTED",
            EventKind::ConnectError => "CONNECT_ERROR",
            EventKind::ChatEnded => "CHAT_ENDED",
            EventKind::Errors => "ERRORS",
            EventKind::ConnectionError => "CONNECTION_ERROR",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `{ "type": ..., "data": ... }` as handed to widget front-ends.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NormalizedEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serde_names_match_as_str() {
        for kind in [
            EventKind::SocketConnected,
            EventKind::SocketReconnected,
            EventKind::ChannelSessionStarted,
            EventKind::MessageReceived,
            EventKind::SocketDisconnected,
            EventKind::ConnectError,
            EventKind::ChatEnded,
            EventKind::Errors,
            EventKind::ConnectionError,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn test_normalized_event_shape() {
        let event = NormalizedEvent {
            kind: EventKind::SocketDisconnected,
            data: json!("transport close"),
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({ "type": "SOCKET_DISCONNECTED", "data": "transport close" })
        );
    }
}
