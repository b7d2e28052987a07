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
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

//! Events delivered to the embedding application.
//!
//! Every inbound transport event becomes exactly one [`WidgetEvent`] on the
//! session's event stream. Application payloads are passed through unchanged.

use ccm_widget_types::events::inbound;
use ccm_widget_types::{EventKind, NormalizedEvent};
use serde::Serialize;
use serde_json::Value;

/// Identifies the channel a connect event belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelInfo {
    /// The Socket.IO URL the channel was opened against.
    pub endpoint: String,
    /// Increments each time the session opens a new channel.
    pub generation: u64,
}

/// Events emitted by a [`WidgetSession`](crate::WidgetSession).
#[derive(Clone, Debug, PartialEq)]
pub enum WidgetEvent {
    // === Connection Events ===
    /// First successful connect since the last connect error.
    SocketConnected(ChannelInfo),

    /// Connected after an earlier connect error.
    SocketReconnected(ChannelInfo),

    /// The channel closed, with the transport's reason.
    SocketDisconnected(String),

    /// The transport could not (re)connect.
    ConnectError(String),

    /// The SDK could not build the channel (invalid socket URL and the like).
    ConnectionError(String),

    // === Conversation Events ===
    ChannelSessionStarted(Value),

    MessageReceived(Value),

    /// The remote side ended the chat. The session disconnects right after.
    ChatEnded(Value),

    /// Application-level errors reported by the backend.
    Errors(Value),
}

impl WidgetEvent {
    /// Map an application event name to its event, if the widget relays it.
    pub fn from_application(event: &str, payload: Value) -> Option<Self> {
        match event {
            inbound::CHANNEL_SESSION_STARTED => Some(Self::ChannelSessionStarted(payload)),
            inbound::MESSAGE_RECEIVED => Some(Self::MessageReceived(payload)),
            inbound::CHAT_ENDED => Some(Self::ChatEnded(payload)),
            inbound::ERRORS => Some(Self::Errors(payload)),
            _ => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::SocketConnected(_) => EventKind::SocketConnected,
            Self::SocketReconnected(_) => EventKind::SocketReconnected,
            Self::SocketDisconnected(_) => EventKind::SocketDisconnected,
            Self::ConnectError(_) => EventKind::ConnectError,
            Self::ConnectionError(_) => EventKind::ConnectionError,
            Self::ChannelSessionStarted(_) => EventKind::ChannelSessionStarted,
            Self::MessageReceived(_) => EventKind::MessageReceived,
            Self::ChatEnded(_) => EventKind::ChatEnded,
            Self::Errors(_) => EventKind::Errors,
        }
    }

    /// The `{ type, data }` shape widget front-ends consume.
    pub fn to_normalized(&self) -> NormalizedEvent {
        let data = match self {
            Self::SocketConnected(info) | Self::SocketReconnected(info) => {
                serde_json::to_value(info).unwrap_or(Value::Null)
            }
            Self::SocketDisconnected(reason) => Value::String(reason.clone()),
            Self::ConnectError(error) | Self::ConnectionError(error) => {
                Value::String(error.clone())
            }
            Self::ChannelSessionStarted(data)
            | Self::MessageReceived(data)
            | Self::ChatEnded(data)
            | Self::Errors(data) => data.clone(),
        };
        NormalizedEvent {
            kind: self.kind(),
            data,
        }
    }
}

impl From<WidgetEvent> for NormalizedEvent {
    fn from(event: WidgetEvent) -> Self {
        event.to_normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_application_events_pass_payload_through() {
        let payload = json!({ "id": "m-1", "body": { "markdownText": "hi" } });
        let event = WidgetEvent::from_application("MESSAGE_RECEIVED", payload.clone()).unwrap();
        assert_eq!(event, WidgetEvent::MessageReceived(payload.clone()));
        assert_eq!(
            event.to_normalized(),
            NormalizedEvent {
                kind: EventKind::MessageReceived,
                data: payload
            }
        );
    }

    #[test]
    fn test_unknown_application_event_is_not_relayed() {
        assert!(WidgetEvent::from_application("CHAT_RESUMED", json!({})).is_none());
        assert!(WidgetEvent::from_application("connect", Value::Null).is_none());
    }

    #[test]
    fn test_connect_event_normalizes_channel_info() {
        let event = WidgetEvent::SocketReconnected(ChannelInfo {
            endpoint: "https://ccm.example.com/socket.io/".into(),
            generation: 2,
        });
        let normalized = serde_json::to_value(event.to_normalized()).unwrap();
        assert_eq!(
            normalized,
            json!({
                "type": "SOCKET_RECONNECTED",
                "data": { "endpoint": "https://ccm.example.com/socket.io/", "generation": 2 }
            })
        );
    }

    #[test]
    fn test_error_events_carry_message() {
        let normalized = WidgetEvent::ConnectionError("bad url".into()).to_normalized();
        assert_eq!(normalized.kind, EventKind::ConnectionError);
        assert_eq!(normalized.data, json!("bad url"));
    }
}
