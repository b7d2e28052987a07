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

/// Error type for channel operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The socket URL could not be turned into an endpoint.
    #[error("Invalid socket URL: {0}")]
    InvalidUrl(String),
    /// The transport could not establish the channel.
    #[error("Channel connection failed: {0}")]
    Connect(String),
    /// An emit was rejected by the transport.
    #[error("Failed to emit '{event}': {reason}")]
    Send { event: String, reason: String },
    /// No acknowledgment arrived for an acknowledged emit.
    #[error("No acknowledgment for '{0}'")]
    AckTimeout(String),
    /// The channel is already closed.
    #[error("Channel is closed")]
    Closed,
}

impl ChannelError {
    /// Whether the failure happened before any network I/O, while the
    /// channel was still being set up locally.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::InvalidUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_local() {
        let err = ChannelError::InvalidUrl("nope".into());
        assert!(err.is_local());
        assert!(format!("{err}").contains("nope"));
    }

    #[test]
    fn test_connect_error_is_not_local() {
        let err = ChannelError::Connect("refused".into());
        assert!(!err.is_local());
        assert!(format!("{err}").contains("refused"));
    }
}
