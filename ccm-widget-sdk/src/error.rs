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

use ccm_widget_transport::ChannelError;
use ccm_widget_types::{Ack, DecodeError};
use thiserror::Error;

/// Errors returned by [`WidgetSession`](crate::WidgetSession) methods.
#[derive(Debug, Error)]
pub enum SessionError {
    /// There is no connected channel to send on.
    #[error("Not connected. Call establish_connection first.")]
    NotConnected,

    /// The transport failed to connect or to emit.
    #[error(transparent)]
    Channel(ChannelError),

    /// The server did not acknowledge within the configured timeout.
    #[error("No acknowledgment for '{0}'")]
    AckTimeout(String),

    /// The server acknowledged with a non-200 code.
    #[error("'{event}' rejected by server with code {}", ack.code)]
    Rejected { event: &'static str, ack: Ack },

    /// An outbound payload could not be serialized.
    #[error("Failed to encode '{event}' payload: {source}")]
    Encode {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An inbound acknowledgment did not match its schema.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl From<ChannelError> for SessionError {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::AckTimeout(event) => Self::AckTimeout(event),
            ChannelError::Closed => Self::NotConnected,
            other => Self::Channel(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn test_channel_errors_are_mapped() {
        assert!(matches!(
            SessionError::from(ChannelError::AckTimeout("CHAT_RESUMED".into())),
            SessionError::AckTimeout(event) if event == "CHAT_RESUMED"
        ));
        assert!(matches!(
            SessionError::from(ChannelError::Closed),
            SessionError::NotConnected
        ));
        assert!(matches!(
            SessionError::from(ChannelError::Connect("refused".into())),
            SessionError::Channel(ChannelError::Connect(_))
        ));
    }

    #[test]
    fn test_rejected_message_names_code() {
        let err = SessionError::Rejected {
            event: "MESSAGE_RECEIVED",
            ack: Ack {
                code: 500,
                fields: Map::new(),
            },
        };
        assert_eq!(
            err.to_string(),
            "'MESSAGE_RECEIVED' rejected by server with code 500"
        );
    }
}
