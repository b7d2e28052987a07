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

//! Session tuning loaded from environment variables.

use std::env;
use std::time::Duration;

pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_EVENT_BUFFER: usize = 256;

/// Tuning knobs for a [`WidgetSession`](crate::WidgetSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// How long `send_message` and `resume_chat` wait for the server's ack.
    pub ack_timeout: Duration,
    /// Capacity of the event stream handed to the caller.
    pub event_buffer: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            ack_timeout: DEFAULT_ACK_TIMEOUT,
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl SessionOptions {
    /// Load options from environment variables.
    ///
    /// # Optional
    /// - `WIDGET_ACK_TIMEOUT_SECS` (default: `"30"`)
    /// - `WIDGET_EVENT_BUFFER` (default: `"256"`)
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let ack_timeout_secs = lookup("WIDGET_ACK_TIMEOUT_SECS")
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|_| "WIDGET_ACK_TIMEOUT_SECS must be a valid integer")?
            .unwrap_or(DEFAULT_ACK_TIMEOUT.as_secs());
        if ack_timeout_secs == 0 {
            return Err("WIDGET_ACK_TIMEOUT_SECS must be greater than zero".to_string());
        }

        let event_buffer = lookup("WIDGET_EVENT_BUFFER")
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<usize>())
            .transpose()
            .map_err(|_| "WIDGET_EVENT_BUFFER must be a valid integer")?
            .unwrap_or(DEFAULT_EVENT_BUFFER);
        // tokio::sync::mpsc panics on a zero capacity.
        if event_buffer == 0 {
            return Err("WIDGET_EVENT_BUFFER must be greater than zero".to_string());
        }

        Ok(Self {
            ack_timeout: Duration::from_secs(ack_timeout_secs),
            event_buffer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let options = SessionOptions::from_lookup(lookup(&[])).unwrap();
        assert_eq!(options, SessionOptions::default());
    }

    #[test]
    fn test_overrides() {
        let options = SessionOptions::from_lookup(lookup(&[
            ("WIDGET_ACK_TIMEOUT_SECS", "5"),
            ("WIDGET_EVENT_BUFFER", "16"),
        ]))
        .unwrap();
        assert_eq!(options.ack_timeout, Duration::from_secs(5));
        assert_eq!(options.event_buffer, 16);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = SessionOptions::from_lookup(lookup(&[("WIDGET_ACK_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.contains("WIDGET_ACK_TIMEOUT_SECS"));

        let err =
            SessionOptions::from_lookup(lookup(&[("WIDGET_EVENT_BUFFER", "0")])).unwrap_err();
        assert!(err.contains("greater than zero"));
    }
}
