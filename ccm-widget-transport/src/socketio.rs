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

//! Socket.IO channel using `rust_socketio`.
//!
//! Every subscribed event is forwarded, in arrival order, into an mpsc
//! channel whose receiver is handed back from [`SocketIoChannel::connect`].
//!
//! # Example
//!
//! ```no_run
//! use ccm_widget_transport::socketio::SocketIoChannel;
//! use ccm_widget_transport::{ChannelEndpoint, ChannelOptions, RealtimeChannel};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), ccm_widget_transport::ChannelError> {
//! let endpoint = ChannelEndpoint::parse("https://ccm.example.com/chat")?;
//! let options = ChannelOptions::new(endpoint, json!({ "serviceIdentifier": "s1" }))
//!     .subscribe(["MESSAGE_RECEIVED"]);
//! let (channel, mut inbound_rx) = SocketIoChannel::connect(options).await?;
//!
//! channel.emit("CHAT_ENDED", json!({})).await?;
//! while let Some(event) = inbound_rx.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::{debug, info, warn};
use rust_socketio::asynchronous::{Client, ClientBuilder};
use rust_socketio::{Event, Payload};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::{ChannelConnector, ChannelError, ChannelOptions, RealtimeChannel, TransportEvent};

/// Reason reported when the server closes the namespace.
const SERVER_DISCONNECT: &str = "io server disconnect";
/// Reason reported when the underlying connection is lost.
const TRANSPORT_CLOSE: &str = "transport close";

/// Prefix `rust_socketio` puts on a server's CONNECT_ERROR packet.
const CONNECT_ERROR_FRAME: &str = "Received an ConnectError frame";
/// `rust_socketio` errors raised by the packet stream itself, after which
/// the engine.io connection is gone and the library starts reconnecting.
const STREAM_ERRORS: [&str; 3] = [
    "EngineIO Error",
    "Got an IO-Error",
    "Underlying Engine.IO connection has closed",
];

/// [`ChannelConnector`] that opens [`SocketIoChannel`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct SocketIoConnector;

#[async_trait]
impl ChannelConnector for SocketIoConnector {
    async fn connect(
        &self,
        options: ChannelOptions,
    ) -> Result<(Arc<dyn RealtimeChannel>, mpsc::Receiver<TransportEvent>), ChannelError> {
        let (channel, inbound_rx) = SocketIoChannel::connect(options).await?;
        let channel: Arc<dyn RealtimeChannel> = Arc::new(channel);
        Ok((channel, inbound_rx))
    }
}

/// A Socket.IO client channel.
pub struct SocketIoChannel {
    client: Client,
    url: String,
    connected: Arc<AtomicBool>,
    /// Set once `disconnect` has closed the client; the library does not
    /// reconnect after that.
    closed: AtomicBool,
}

impl std::fmt::Debug for SocketIoChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketIoChannel")
            .field("url", &self.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl SocketIoChannel {
    /// Connect to a Socket.IO server.
    ///
    /// Returns the channel and a receiver for inbound events. The receiver
    /// yields [`TransportEvent::Connected`] once the handshake completes.
    pub async fn connect(
        options: ChannelOptions,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>), ChannelError> {
        let url = options.endpoint.url();
        info!("Socket.IO connecting to {url}");

        let (inbound_tx, inbound_rx) = mpsc::channel(options.buffer);
        let connected = Arc::new(AtomicBool::new(false));

        let mut builder = ClientBuilder::new(url.clone())
            .auth(options.auth)
            .on(
                Event::Connect,
                forward(inbound_tx.clone(), {
                    let connected = connected.clone();
                    move |_| {
                        connected.store(true, Ordering::Release);
                        Some(TransportEvent::Connected)
                    }
                }),
            )
            .on(
                Event::Close,
                forward(inbound_tx.clone(), {
                    let connected = connected.clone();
                    move |payload| {
                        connected.store(false, Ordering::Release);
                        Some(TransportEvent::Disconnected(reason(payload, SERVER_DISCONNECT)))
                    }
                }),
            )
            .on(
                Event::Error,
                forward(inbound_tx.clone(), {
                    let connected = connected.clone();
                    move |payload| on_error(&connected, payload)
                }),
            );

        for event in options.events {
            debug!("Socket.IO subscribing to '{event}'");
            let name = event.clone();
            builder = builder.on(
                Event::Custom(event),
                forward(inbound_tx.clone(), move |payload| {
                    Some(TransportEvent::Message {
                        event: name.clone(),
                        payload: payload_to_value(payload),
                    })
                }),
            );
        }

        let client = builder.connect().await.map_err(|e| {
            ChannelError::Connect(format!("Socket.IO connection to '{url}' failed: {e}"))
        })?;
        connected.store(true, Ordering::Release);
        info!("Socket.IO connected to {url}");

        Ok((
            Self {
                client,
                url,
                connected,
                closed: AtomicBool::new(false),
            },
            inbound_rx,
        ))
    }
}

#[async_trait]
impl RealtimeChannel for SocketIoChannel {
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::Closed);
        }
        self.client
            .emit(event.to_string(), Payload::Text(vec![payload]))
            .await
            .map_err(|e| ChannelError::Send {
                event: event.to_string(),
                reason: e.to_string(),
            })
    }

    async fn emit_with_ack(
        &self,
        event: &str,
        payload: Value,
        timeout: Duration,
    ) -> Result<Value, ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::Closed);
        }

        let (ack_tx, ack_rx) = oneshot::channel();
        // The library takes an FnMut; the sender can only be used once.
        let ack_tx = Arc::new(Mutex::new(Some(ack_tx)));
        let on_ack = move |payload: Payload, _client: Client| -> BoxFuture<'static, ()> {
            let sender = ack_tx.lock().ok().and_then(|mut slot| slot.take());
            async move {
                if let Some(sender) = sender {
                    let _ = sender.send(payload_to_value(payload));
                }
            }
            .boxed()
        };

        self.client
            .emit_with_ack(event.to_string(), Payload::Text(vec![payload]), timeout, on_ack)
            .await
            .map_err(|e| ChannelError::Send {
                event: event.to_string(),
                reason: e.to_string(),
            })?;

        match tokio::time::timeout(timeout, ack_rx).await {
            Ok(Ok(ack)) => Ok(ack),
            _ => Err(ChannelError::AckTimeout(event.to_string())),
        }
    }

    async fn disconnect(&self) -> Result<(), ChannelError> {
        // Close the client even if the server already dropped the namespace;
        // otherwise the library's poll task keeps reconnecting.
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.connected.store(false, Ordering::Release);
        info!("Socket.IO disconnecting from {}", self.url);
        if let Err(e) = self.client.disconnect().await {
            warn!("Error closing Socket.IO channel: {e}");
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.closed.load(Ordering::Acquire) && self.connected.load(Ordering::Acquire)
    }
}

/// Build a `rust_socketio` callback that maps the payload with `to_event`
/// and pushes the result, if any, into the inbound queue.
fn forward<F>(
    inbound_tx: mpsc::Sender<TransportEvent>,
    to_event: F,
) -> impl FnMut(Payload, Client) -> BoxFuture<'static, ()> + Send + Sync + 'static
where
    F: Fn(Payload) -> Option<TransportEvent> + Send + Sync + 'static,
{
    move |payload: Payload, _client: Client| {
        let inbound_tx = inbound_tx.clone();
        let event = to_event(payload);
        async move {
            let Some(event) = event else { return };
            if let Err(e) = inbound_tx.send(event).await {
                debug!("Inbound channel closed: {e}");
            }
        }
        .boxed()
    }
}

/// What an `Event::Error` report from `rust_socketio` means for the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ErrorReport {
    /// The server refused the namespace connection.
    Rejected(String),
    /// The engine.io connection is gone; the library will try to reconnect.
    TransportLost(String),
    /// A single inbound packet or ack could not be handled.
    Packet(String),
}

pub(crate) fn classify_error(message: String) -> ErrorReport {
    if message.starts_with(CONNECT_ERROR_FRAME) {
        ErrorReport::Rejected(message)
    } else if STREAM_ERRORS.iter().any(|e| message.starts_with(e)) {
        ErrorReport::TransportLost(message)
    } else {
        ErrorReport::Packet(message)
    }
}

/// Map an error report to the event the dispatcher should see.
///
/// Losing the transport is reported once as a disconnect, no matter how
/// many stream errors follow. Packet errors are only logged.
pub(crate) fn on_error(connected: &AtomicBool, payload: Payload) -> Option<TransportEvent> {
    match classify_error(reason(payload, "transport error")) {
        ErrorReport::Rejected(message) => {
            connected.store(false, Ordering::Release);
            Some(TransportEvent::ConnectError(message))
        }
        ErrorReport::TransportLost(message) => {
            if connected.swap(false, Ordering::AcqRel) {
                warn!("Socket.IO transport lost: {message}");
                Some(TransportEvent::Disconnected(TRANSPORT_CLOSE.to_string()))
            } else {
                debug!("Socket.IO still down: {message}");
                None
            }
        }
        ErrorReport::Packet(message) => {
            warn!("Dropping malformed Socket.IO packet: {message}");
            None
        }
    }
}

/// Socket.IO delivers event arguments as a list; a single argument is
/// unwrapped so payloads reach the caller exactly as the server sent them.
#[allow(deprecated)]
pub(crate) fn payload_to_value(payload: Payload) -> Value {
    match payload {
        Payload::Text(mut values) => match values.len() {
            0 => Value::Null,
            1 => values.remove(0),
            _ => Value::Array(values),
        },
        Payload::Binary(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
        Payload::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
    }
}

fn reason(payload: Payload, fallback: &str) -> String {
    match payload_to_value(payload) {
        Value::String(s) if !s.is_empty() => s,
        Value::Null => fallback.to_string(),
        Value::String(_) => fallback.to_string(),
        other => other.to_string(),
    }
}
