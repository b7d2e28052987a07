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

//! The widget's realtime session: one channel, one event stream and the
//! outbound request emitters.

use ccm_widget_transport::{
    ChannelConnector, ChannelEndpoint, ChannelError, ChannelOptions, RealtimeChannel,
};
use ccm_widget_types::events::{inbound, outbound};
use ccm_widget_types::responses::is_truthy;
use ccm_widget_types::{Ack, ChatMessage, ChatRequestInput, ChatRequestPayload};
use log::{debug, error, info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::dispatcher::EventDispatcher;
use crate::error::SessionError;
use crate::events::{ChannelInfo, WidgetEvent};
use crate::flag_store::{self, FlagStore};
use crate::options::SessionOptions;
use crate::state::{ActiveChannel, ConnectionState, ConnectionStatus, SharedState};

/// Receiving end of a session's events, in arrival order.
pub type EventStream = mpsc::Receiver<WidgetEvent>;

/// What [`WidgetSession::establish_connection`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new channel was opened.
    Created,
    /// The live channel was kept; no handlers were added.
    Reused,
    /// Another call is still opening a channel.
    Pending,
    /// The socket URL was empty.
    Skipped,
}

/// A contact-center widget session.
///
/// Owns at most one live channel. All events from every channel the session
/// opens are delivered on the [`EventStream`] returned by
/// [`WidgetSession::new`].
pub struct WidgetSession {
    connector: Arc<dyn ChannelConnector>,
    flags: Arc<dyn FlagStore>,
    options: SessionOptions,
    state: SharedState,
    events_tx: mpsc::Sender<WidgetEvent>,
    generation: AtomicU64,
}

impl std::fmt::Debug for WidgetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetSession")
            .field("state", &self.state.status())
            .field("flags", &self.flags)
            .field("options", &self.options)
            .finish()
    }
}

/// Puts the state back to `Disconnected` if a connect attempt is abandoned
/// before it finishes.
struct ConnectingGuard<'a> {
    state: &'a SharedState,
    armed: bool,
}

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock();
            if let ConnectionState::Connecting = *state {
                *state = ConnectionState::Disconnected;
            }
        }
    }
}

impl WidgetSession {
    pub fn new(
        connector: Arc<dyn ChannelConnector>,
        flags: Arc<dyn FlagStore>,
        mut options: SessionOptions,
    ) -> (Self, EventStream) {
        // tokio::sync::mpsc panics on a zero capacity.
        if options.event_buffer == 0 {
            warn!("event_buffer must be at least 1, using 1");
            options.event_buffer = 1;
        }
        let (events_tx, events_rx) = mpsc::channel(options.event_buffer);
        let session = Self {
            connector,
            flags,
            options,
            state: SharedState::default(),
            events_tx,
            generation: AtomicU64::new(0),
        };
        (session, events_rx)
    }

    /// A session over Socket.IO.
    #[cfg(feature = "socketio")]
    pub fn socketio(flags: Arc<dyn FlagStore>, options: SessionOptions) -> (Self, EventStream) {
        Self::new(
            Arc::new(ccm_widget_transport::socketio::SocketIoConnector),
            flags,
            options,
        )
    }

    pub fn state(&self) -> ConnectionStatus {
        self.state.status()
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state(), ConnectionStatus::Connected { .. })
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Open the session's channel unless a live one exists.
    ///
    /// URL and setup failures are reported on the event stream as
    /// [`WidgetEvent::ConnectionError`], transport failures as
    /// [`WidgetEvent::ConnectError`]; both are also returned.
    pub async fn establish_connection(
        &self,
        socket_url: &str,
        service_identifier: &str,
        customer_identifier: &str,
    ) -> Result<ConnectOutcome, SessionError> {
        let stale = {
            let mut state = self.state.lock();
            match &*state {
                ConnectionState::Connected(active) if active.channel.is_connected() => {
                    debug!("Reusing live channel #{}", active.generation);
                    return Ok(ConnectOutcome::Reused);
                }
                ConnectionState::Connecting => {
                    debug!("Connection already in progress");
                    return Ok(ConnectOutcome::Pending);
                }
                _ => {}
            }
            if socket_url.is_empty() {
                warn!("No socket URL configured, not connecting");
                return Ok(ConnectOutcome::Skipped);
            }
            match std::mem::replace(&mut *state, ConnectionState::Connecting) {
                ConnectionState::Connected(stale) => Some(stale),
                _ => None,
            }
        };
        let mut guard = ConnectingGuard {
            state: &self.state,
            armed: true,
        };

        if let Some(stale) = stale {
            debug!("Replacing closed channel #{}", stale.generation);
            stale.dispatcher.abort();
            if let Err(e) = stale.channel.disconnect().await {
                warn!("Error closing channel #{}: {e}", stale.generation);
            }
        }

        let endpoint = match ChannelEndpoint::parse(socket_url) {
            Ok(endpoint) => endpoint,
            Err(e) => {
                error!("Invalid socket URL '{socket_url}': {e}");
                self.emit_event(WidgetEvent::ConnectionError(e.to_string()))
                    .await;
                return Err(e.into());
            }
        };
        let url = endpoint.url();
        let options = ChannelOptions::new(
            endpoint,
            json!({
                "serviceIdentifier": service_identifier,
                "channelCustomerIdentifier": customer_identifier,
            }),
        )
        .subscribe(inbound::PASS_THROUGH);

        info!("Opening channel to {url}");
        let (channel, inbound_rx) = match self.connector.connect(options).await {
            Ok(opened) => opened,
            Err(e) => {
                self.report_connect_failure(&e).await;
                return Err(e.into());
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let dispatcher = EventDispatcher {
            info: ChannelInfo {
                endpoint: url,
                generation,
            },
            channel: channel.clone(),
            flags: self.flags.clone(),
            events_tx: self.events_tx.clone(),
            state: self.state.clone(),
        };
        {
            // The dispatcher cannot observe the state before it is Connected.
            let mut state = self.state.lock();
            *state = ConnectionState::Connected(ActiveChannel {
                generation,
                channel,
                dispatcher: dispatcher.spawn(inbound_rx),
            });
        }
        guard.armed = false;
        Ok(ConnectOutcome::Created)
    }

    /// Close the channel, if any. Events already queued stay on the stream.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        let Some(active) = self.state.take() else {
            debug!("disconnect() without a channel");
            return Ok(());
        };
        info!("Closing channel #{}", active.generation);
        active.dispatcher.abort();
        active.channel.disconnect().await?;
        Ok(())
    }

    pub async fn chat_request(&self, input: &ChatRequestInput) -> Result<(), SessionError> {
        self.request(outbound::CHAT_REQUESTED, input).await
    }

    pub async fn voice_request(&self, input: &ChatRequestInput) -> Result<(), SessionError> {
        self.request(outbound::VOICE_REQUESTED, input).await
    }

    async fn request(
        &self,
        event: &'static str,
        input: &ChatRequestInput,
    ) -> Result<(), SessionError> {
        let channel = self.channel()?;
        let payload = encode(event, &ChatRequestPayload::from(input))?;
        channel.emit(event, payload).await?;
        info!(
            "{event} sent for customer {}",
            input.channel_customer_identifier
        );
        Ok(())
    }

    /// Send a chat message and wait for the server's acknowledgment.
    ///
    /// The timestamp is cleared before sending; the server stamps messages.
    pub async fn send_message(&self, mut message: ChatMessage) -> Result<Ack, SessionError> {
        let event = outbound::MESSAGE_RECEIVED;
        let channel = self.channel()?;
        message.clear_timestamp();
        let payload = encode(event, &message)?;

        let ack = Ack::from_value(
            channel
                .emit_with_ack(event, payload, self.options.ack_timeout)
                .await?,
        )?;
        if !ack.is_ok() {
            warn!("Message rejected with code {}", ack.code);
            return Err(SessionError::Rejected { event, ack });
        }
        debug!("Message acknowledged");
        Ok(ack)
    }

    pub async fn chat_end<T: Serialize + ?Sized>(&self, data: &T) -> Result<(), SessionError> {
        let event = outbound::CHAT_ENDED;
        let channel = self.channel()?;
        channel.emit(event, encode(event, data)?).await?;
        info!("{event} sent");
        Ok(())
    }

    /// Ask the server to resume a chat.
    ///
    /// Returns the acknowledgment when the server sends a non-empty one and
    /// `None` when it acknowledges with nothing.
    pub async fn resume_chat<T: Serialize + ?Sized>(
        &self,
        data: &T,
    ) -> Result<Option<Value>, SessionError> {
        let event = outbound::CHAT_RESUMED;
        let channel = self.channel()?;
        let ack = channel
            .emit_with_ack(event, encode(event, data)?, self.options.ack_timeout)
            .await?;
        if is_truthy(&ack) {
            info!("Chat resumed");
            Ok(Some(ack))
        } else {
            debug!("Empty acknowledgment for {event}");
            Ok(None)
        }
    }

    fn channel(&self) -> Result<Arc<dyn RealtimeChannel>, SessionError> {
        match &*self.state.lock() {
            ConnectionState::Connected(active) if active.channel.is_connected() => {
                Ok(active.channel.clone())
            }
            _ => {
                debug!("No live channel");
                Err(SessionError::NotConnected)
            }
        }
    }

    async fn report_connect_failure(&self, e: &ChannelError) {
        if e.is_local() {
            error!("Failed to set up channel: {e}");
            self.emit_event(WidgetEvent::ConnectionError(e.to_string()))
                .await;
        } else {
            warn!("Connect failed: {e}");
            flag_store::mark_connect_error(self.flags.as_ref());
            self.emit_event(WidgetEvent::ConnectError(e.to_string()))
                .await;
        }
    }

    async fn emit_event(&self, event: WidgetEvent) {
        if self.events_tx.send(event).await.is_err() {
            debug!("Event stream closed by the caller");
        }
    }
}

impl Drop for WidgetSession {
    fn drop(&mut self) {
        let Some(active) = self.state.take() else {
            return;
        };
        active.dispatcher.abort();
        // Dropping the handle alone leaves the transport's own tasks running.
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let channel = active.channel;
                runtime.spawn(async move {
                    if let Err(e) = channel.disconnect().await {
                        warn!("Error closing channel on drop: {e}");
                    }
                });
            }
            Err(_) => warn!(
                "Session for channel #{} dropped outside a runtime; channel not closed",
                active.generation
            ),
        }
    }
}

fn encode<T: Serialize + ?Sized>(event: &'static str, data: &T) -> Result<Value, SessionError> {
    serde_json::to_value(data).map_err(|source| SessionError::Encode { event, source })
}
