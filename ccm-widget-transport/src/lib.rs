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

//! Realtime channel layer for the contact-center widget SDK.
//!
//! The SDK talks to the backend through the [`RealtimeChannel`] and
//! [`ChannelConnector`] traits; it never touches the Socket.IO client
//! directly. A connector opens a channel and hands back the receiving end
//! of an ordered [`TransportEvent`] stream.
//!
//! # Features
//!
//! - **`socketio`** (default): Socket.IO transport using `rust_socketio`
//! - **`testing`**: In-process mock channel for unit and integration tests

pub mod endpoint;
pub mod error;

#[cfg(feature = "socketio")]
pub mod socketio;

#[cfg(feature = "testing")]
pub mod mock;

pub use endpoint::ChannelEndpoint;
pub use error::ChannelError;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the inbound event queue between transport and dispatcher.
pub const DEFAULT_EVENT_BUFFER: usize = 100;

/// An inbound event as reported by the transport, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// The channel finished its handshake (`connect`).
    Connected,
    /// The channel closed (`disconnect`), with the reason.
    Disconnected(String),
    /// The transport failed to (re)connect (`connect_error`).
    ConnectError(String),
    /// An application event and its payload.
    Message { event: String, payload: Value },
}

/// Everything a connector needs to open a channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelOptions {
    pub endpoint: ChannelEndpoint,
    /// Sent with the handshake, e.g. `{ serviceIdentifier, channelCustomerIdentifier }`.
    pub auth: Value,
    /// Application event names to subscribe to.
    pub events: Vec<String>,
    pub buffer: usize,
}

impl ChannelOptions {
    pub fn new(endpoint: ChannelEndpoint, auth: Value) -> Self {
        Self {
            endpoint,
            auth,
            events: Vec::new(),
            buffer: DEFAULT_EVENT_BUFFER,
        }
    }

    pub fn subscribe<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events.extend(events.into_iter().map(Into::into));
        self
    }
}

/// A live bidirectional channel.
#[async_trait]
pub trait RealtimeChannel: Send + Sync + std::fmt::Debug {
    /// Emit `event` without waiting for an acknowledgment.
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError>;

    /// Emit `event` and wait up to `timeout` for the server's acknowledgment.
    async fn emit_with_ack(
        &self,
        event: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, ChannelError>;

    /// Close the channel. Closing an already closed channel is a no-op.
    async fn disconnect(&self) -> Result<(), ChannelError>;

    fn is_connected(&self) -> bool;
}

/// Opens channels. Implemented per transport.
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    async fn connect(
        &self,
        options: ChannelOptions,
    ) -> Result<(Arc<dyn RealtimeChannel>, mpsc::Receiver<TransportEvent>), ChannelError>;
}
