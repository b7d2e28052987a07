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

//! Maps transport events of one channel to [`WidgetEvent`]s.
//!
//! Exactly one dispatcher task runs per channel, so handlers are registered
//! once no matter how often the caller asks to connect.

use ccm_widget_transport::{RealtimeChannel, TransportEvent};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::events::{ChannelInfo, WidgetEvent};
use crate::flag_store::{self, FlagStore};
use crate::state::SharedState;

pub(crate) struct EventDispatcher {
    pub info: ChannelInfo,
    pub channel: Arc<dyn RealtimeChannel>,
    pub flags: Arc<dyn FlagStore>,
    pub events_tx: mpsc::Sender<WidgetEvent>,
    pub state: SharedState,
}

enum Flow {
    Continue,
    Stop,
}

impl EventDispatcher {
    pub fn spawn(self, inbound_rx: mpsc::Receiver<TransportEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(inbound_rx))
    }

    async fn run(self, mut inbound_rx: mpsc::Receiver<TransportEvent>) {
        debug!("Dispatcher for channel #{} started", self.info.generation);
        while let Some(event) = inbound_rx.recv().await {
            if let Flow::Stop = self.dispatch(event).await {
                break;
            }
        }
        debug!("Dispatcher for channel #{} stopped", self.info.generation);
    }

    async fn dispatch(&self, event: TransportEvent) -> Flow {
        match event {
            TransportEvent::Connected => {
                let event = if flag_store::take_connect_error(self.flags.as_ref()) {
                    info!("Channel #{} reconnected", self.info.generation);
                    WidgetEvent::SocketReconnected(self.info.clone())
                } else {
                    info!("Channel #{} connected", self.info.generation);
                    WidgetEvent::SocketConnected(self.info.clone())
                };
                self.deliver(event).await;
            }
            TransportEvent::Disconnected(reason) => {
                info!("Channel #{} disconnected: {reason}", self.info.generation);
                self.deliver(WidgetEvent::SocketDisconnected(reason)).await;
            }
            TransportEvent::ConnectError(error) => {
                warn!("Channel #{} connect error: {error}", self.info.generation);
                flag_store::mark_connect_error(self.flags.as_ref());
                self.deliver(WidgetEvent::ConnectError(error)).await;
            }
            TransportEvent::Message { event, payload } => {
                debug!("Channel #{} received '{event}'", self.info.generation);
                match WidgetEvent::from_application(&event, payload) {
                    Some(WidgetEvent::ChatEnded(payload)) => {
                        self.end_chat().await;
                        self.deliver(WidgetEvent::ChatEnded(payload)).await;
                        return Flow::Stop;
                    }
                    Some(event) => self.deliver(event).await,
                    None => warn!("Dropping unexpected event '{event}'"),
                }
            }
        }
        Flow::Continue
    }

    /// Close the channel and give up the session's handle on it, so the
    /// caller observes a disconnected session by the time CHAT_ENDED arrives.
    async fn end_chat(&self) {
        info!("Chat ended, closing channel #{}", self.info.generation);
        if let Err(e) = self.channel.disconnect().await {
            warn!("Error closing channel #{}: {e}", self.info.generation);
        }
        self.state.release(self.info.generation);
    }

    async fn deliver(&self, event: WidgetEvent) {
        if self.events_tx.send(event).await.is_err() {
            debug!("Event stream closed by the caller");
        }
    }
}
