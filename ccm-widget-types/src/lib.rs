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

//! Shared wire types for the contact-center widget SDK.
//!
//! This crate defines the contract between the widget and the CCM backend:
//! the widget configuration and form bodies served over HTTP, the payloads
//! emitted on the realtime channel, and the normalized events handed to the
//! embedding application. It is transport-agnostic; no HTTP or socket types.

pub mod config;
pub mod error;
pub mod events;
pub mod forms;
pub mod requests;
pub mod responses;

pub use config::{DialerSettings, WebRtcConfig, WidgetConfig, WidgetConfigResponse};
pub use error::DecodeError;
pub use events::{EventKind, NormalizedEvent};
pub use forms::{FormDefinition, FormValidation};
pub use requests::{
    AdditionalAttribute, ChatMessage, ChatRequestInput, ChatRequestPayload, WebChannelData,
};
pub use responses::Ack;
