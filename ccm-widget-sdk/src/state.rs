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

use ccm_widget_transport::RealtimeChannel;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;

/// The channel a session currently owns.
pub(crate) struct ActiveChannel {
    pub generation: u64,
    pub channel: Arc<dyn RealtimeChannel>,
    pub dispatcher: JoinHandle<()>,
}

impl fmt::Debug for ActiveChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveChannel")
            .field("generation", &self.generation)
            .field("channel", &self.channel)
            .finish()
    }
}

#[derive(Debug, Default)]
pub(crate) enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected(ActiveChannel),
}

/// Connection state as observed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Disconnected,
    Connecting,
    Connected { generation: u64 },
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting"),
            ConnectionStatus::Connected { generation } => write!(f, "Connected (#{generation})"),
        }
    }
}

/// State shared by a session and its dispatcher.
///
/// The lock is never held across an `.await`.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedState(Arc<Mutex<ConnectionState>>);

impl SharedState {
    pub fn lock(&self) -> MutexGuard<'_, ConnectionState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn status(&self) -> ConnectionStatus {
        match &*self.lock() {
            ConnectionState::Disconnected => ConnectionStatus::Disconnected,
            ConnectionState::Connecting => ConnectionStatus::Connecting,
            ConnectionState::Connected(active) if active.channel.is_connected() => {
                ConnectionStatus::Connected {
                    generation: active.generation,
                }
            }
            ConnectionState::Connected(_) => ConnectionStatus::Disconnected,
        }
    }

    /// Drop the channel of `generation`, leaving newer channels alone.
    ///
    /// Returns whether the state changed.
    pub fn release(&self, generation: u64) -> bool {
        let mut state = self.lock();
        match &*state {
            ConnectionState::Connected(active) if active.generation == generation => {
                *state = ConnectionState::Disconnected;
                true
            }
            _ => false,
        }
    }

    /// Take the active channel out, leaving the state `Disconnected`.
    pub fn take(&self) -> Option<ActiveChannel> {
        let mut state = self.lock();
        match std::mem::take(&mut *state) {
            ConnectionState::Connected(active) => Some(active),
            other => {
                *state = other;
                None
            }
        }
    }
}
