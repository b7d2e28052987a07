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

//! In-process channel for tests.
//!
//! [`MockConnector`] records every connect attempt and hands out
//! [`MockChannel`]s. Tests push inbound events with [`MockChannel::inject`]
//! and inspect outbound traffic with [`MockChannel::emitted`].

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

use crate::{ChannelConnector, ChannelError, ChannelOptions, RealtimeChannel, TransportEvent};

#[derive(Default)]
struct ConnectorState {
    attempts: Vec<ChannelOptions>,
    channels: Vec<Arc<MockChannel>>,
    fail_with: Option<ChannelError>,
    acks: HashMap<String, Value>,
    gate: Option<Arc<Semaphore>>,
}

/// A [`ChannelConnector`] that never touches the network.
#[derive(Clone)]
pub struct MockConnector {
    state: Arc<Mutex<ConnectorState>>,
    announce_connect: bool,
}

impl Default for MockConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConnector {
    /// Channels opened by this connector immediately queue
    /// [`TransportEvent::Connected`], like a real handshake would.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            announce_connect: true,
        }
    }

    /// Channels stay silent until the test injects events.
    pub fn silent() -> Self {
        Self {
            state: Arc::default(),
            announce_connect: false,
        }
    }

    /// Make every following connect attempt fail with `error`.
    pub fn fail_with(&self, error: ChannelError) {
        self.state.lock().unwrap().fail_with = Some(error);
    }

    /// Answer acknowledged emits of `event` with `ack`. Events without a
    /// configured answer time out.
    pub fn ack(&self, event: &str, ack: Value) {
        self.state.lock().unwrap().acks.insert(event.to_string(), ack);
    }

    /// Hold every following connect attempt until the returned gate lets
    /// it through, one attempt per [`ConnectGate::release`].
    pub fn hold_connects(&self) -> ConnectGate {
        let gate = Arc::new(Semaphore::new(0));
        self.state.lock().unwrap().gate = Some(gate.clone());
        ConnectGate(gate)
    }

    /// Number of connect attempts, successful or not.
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts.len()
    }

    pub fn last_options(&self) -> Option<ChannelOptions> {
        self.state.lock().unwrap().attempts.last().cloned()
    }

    /// Channels opened so far, oldest first.
    pub fn channels(&self) -> Vec<Arc<MockChannel>> {
        self.state.lock().unwrap().channels.clone()
    }

    pub fn last_channel(&self) -> Option<Arc<MockChannel>> {
        self.state.lock().unwrap().channels.last().cloned()
    }
}

#[async_trait]
impl ChannelConnector for MockConnector {
    async fn connect(
        &self,
        options: ChannelOptions,
    ) -> Result<(Arc<dyn RealtimeChannel>, mpsc::Receiver<TransportEvent>), ChannelError> {
        let gate = self.state.lock().unwrap().gate.clone();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(options.buffer);
        let channel = {
            let mut state = self.state.lock().unwrap();
            state.attempts.push(options);
            if let Some(error) = state.fail_with.clone() {
                return Err(error);
            }
            let channel = Arc::new(MockChannel {
                inbound_tx,
                emitted: Mutex::default(),
                acks: state.acks.clone(),
                connected: AtomicBool::new(true),
                disconnects: AtomicUsize::new(0),
            });
            state.channels.push(channel.clone());
            channel
        };
        if self.announce_connect {
            channel.inject(TransportEvent::Connected).await;
        }
        let channel: Arc<dyn RealtimeChannel> = channel;
        Ok((channel, inbound_rx))
    }
}

/// Releases connect attempts held by [`MockConnector::hold_connects`].
#[derive(Clone)]
pub struct ConnectGate(Arc<Semaphore>);

impl ConnectGate {
    /// Let one held or future connect attempt proceed.
    pub fn release(&self) {
        self.0.add_permits(1);
    }
}

/// A channel whose traffic is recorded in memory.
#[derive(Debug)]
pub struct MockChannel {
    inbound_tx: mpsc::Sender<TransportEvent>,
    emitted: Mutex<Vec<(String, Value)>>,
    acks: HashMap<String, Value>,
    connected: AtomicBool,
    disconnects: AtomicUsize,
}

impl MockChannel {
    /// Deliver an inbound event as if the server had sent it.
    pub async fn inject(&self, event: TransportEvent) {
        if let TransportEvent::Disconnected(_) = event {
            self.connected.store(false, Ordering::Release);
        }
        let _ = self.inbound_tx.send(event).await;
    }

    /// Deliver an application event.
    pub async fn inject_message(&self, event: &str, payload: Value) {
        self.inject(TransportEvent::Message {
            event: event.to_string(),
            payload,
        })
        .await;
    }

    /// How often [`RealtimeChannel::disconnect`] was called.
    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::Acquire)
    }

    /// Everything emitted so far, in order.
    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap().clone()
    }

    fn record(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        if !self.is_connected() {
            return Err(ChannelError::Closed);
        }
        self.emitted
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }
}

#[async_trait]
impl RealtimeChannel for MockChannel {
    async fn emit(&self, event: &str, payload: Value) -> Result<(), ChannelError> {
        self.record(event, payload)
    }

    async fn emit_with_ack(
        &self,
        event: &str,
        payload: Value,
        _timeout: Duration,
    ) -> Result<Value, ChannelError> {
        self.record(event, payload)?;
        self.acks
            .get(event)
            .cloned()
            .ok_or_else(|| ChannelError::AckTimeout(event.to_string()))
    }

    async fn disconnect(&self) -> Result<(), ChannelError> {
        self.disconnects.fetch_add(1, Ordering::AcqRel);
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}
