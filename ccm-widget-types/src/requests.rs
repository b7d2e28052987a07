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

//! Outbound request payloads emitted on the realtime channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DecodeError;

/// Key and type tag of the single additional attribute the widget sends.
pub const WEB_CHANNEL_DATA: &str = "WebChannelData";

/// Caller input for a chat or voice request.
///
/// The embedding page historically passes this wrapped as `{ "data": { ... } }`;
/// see [`ChatRequestInput::from_envelope`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestInput {
    pub channel_customer_identifier: String,
    pub service_identifier: String,
    #[serde(default)]
    pub browser_device_info: Value,
    #[serde(default)]
    pub queue: Value,
    #[serde(default)]
    pub locale: Value,
    #[serde(default)]
    pub form_data: Value,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

impl ChatRequestInput {
    /// Decode the `{ "data": { ... } }` shape used by widget front-ends.
    pub fn from_envelope(value: Value) -> Result<Self, DecodeError> {
        let envelope: Envelope<Self> =
            serde_json::from_value(value).map_err(DecodeError::schema("chat request"))?;
        envelope.data.validated()
    }

    /// Decode an unwrapped input object.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let input: Self =
            serde_json::from_value(value).map_err(DecodeError::schema("chat request"))?;
        input.validated()
    }

    fn validated(self) -> Result<Self, DecodeError> {
        if self.channel_customer_identifier.is_empty() {
            return Err(DecodeError::EmptyField {
                kind: "chat request",
                field: "channelCustomerIdentifier",
            });
        }
        if self.service_identifier.is_empty() {
            return Err(DecodeError::EmptyField {
                kind: "chat request",
                field: "serviceIdentifier",
            });
        }
        Ok(self)
    }
}

/// Device, queue, locale and form context carried with a request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebChannelData {
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub browser_device_info: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub queue: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub locale: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub form_data: Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdditionalAttribute {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: WebChannelData,
}

/// Body of `CHAT_REQUESTED` and `VOICE_REQUESTED`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestPayload {
    pub channel_customer_identifier: String,
    pub service_identifier: String,
    pub additional_attributes: Vec<AdditionalAttribute>,
}

impl From<&ChatRequestInput> for ChatRequestPayload {
    fn from(input: &ChatRequestInput) -> Self {
        let web_channel_data = AdditionalAttribute {
            key: WEB_CHANNEL_DATA.to_string(),
            kind: WEB_CHANNEL_DATA.to_string(),
            value: WebChannelData {
                browser_device_info: input.browser_device_info.clone(),
                queue: input.queue.clone(),
                locale: input.locale.clone(),
                form_data: input.form_data.clone(),
            },
        };
        Self {
            channel_customer_identifier: input.channel_customer_identifier.clone(),
            service_identifier: input.service_identifier.clone(),
            additional_attributes: vec![web_channel_data],
        }
    }
}

/// An outbound chat message.
///
/// The message body belongs to the backend's message schema and is carried
/// as-is; only `timestamp` is touched, because the server stamps messages
/// itself.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ChatMessage {
    #[serde(default)]
    pub timestamp: Value,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

impl ChatMessage {
    /// Decode a message object; anything but a JSON object is rejected.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        serde_json::from_value(value).map_err(DecodeError::schema("chat message"))
    }

    pub fn clear_timestamp(&mut self) {
        self.timestamp = Value::String(String::new());
    }
}
