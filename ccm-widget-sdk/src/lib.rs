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

//! Realtime session for the contact-center chat and voice widget.
//!
//! A [`WidgetSession`] owns a single channel to the backend. It delivers
//! every inbound event, normalized, on the [`EventStream`] returned by
//! [`WidgetSession::new`], and sends chat, voice, message, resume and
//! end requests over the same channel.
//!
//! ```no_run
//! use ccm_widget_sdk::{FileFlagStore, SessionOptions, WidgetEvent, WidgetSession};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (session, mut events) =
//!     WidgetSession::socketio(Arc::new(FileFlagStore::from_env()), SessionOptions::from_env()?);
//! session
//!     .establish_connection("https://ccm.example.com/chat", "service-1", "customer-1")
//!     .await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{}", serde_json::to_string(&event.to_normalized())?);
//!     if let WidgetEvent::ChatEnded(_) = event {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod dispatcher;
pub mod error;
pub mod events;
pub mod flag_store;
pub mod options;
pub mod session;
mod state;

pub use error::SessionError;
pub use events::{ChannelInfo, WidgetEvent};
pub use flag_store::{FileFlagStore, FlagStore, FlagStoreError, MemoryFlagStore, WIDGET_ERROR_KEY};
pub use options::SessionOptions;
pub use session::{ConnectOutcome, EventStream, WidgetSession};
pub use state::ConnectionStatus;

pub use ccm_widget_types::{
    Ack, ChatMessage, ChatRequestInput, DecodeError, EventKind, NormalizedEvent,
};
