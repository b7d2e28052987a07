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

//! Widget configuration served by `GET /widget-configs/{widget_identifier}`.
//!
//! Only the `webRtc` namespace is interpreted; every other field of the body
//! is kept verbatim in [`WidgetConfig::raw`].

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::DecodeError;

/// The typed part of the widget configuration body.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfigResponse {
    pub web_rtc: WebRtcConfig,
}

/// The `webRtc` section of the widget configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WebRtcConfig {
    /// Secure websocket address of the media/signalling server.
    #[serde(default)]
    pub wss_fs: String,

    /// Host part of the dialer SIP URI.
    #[serde(default)]
    pub uri_fs: String,

    /// User part of the dialer SIP URI.
    #[serde(default, deserialize_with = "string_or_number")]
    pub dialling_uri: String,

    #[serde(default, deserialize_with = "string_or_number")]
    pub sip_extension: String,

    #[serde(default)]
    pub extension_password: String,

    /// Whether the SIP stack should emit its own logs.
    #[serde(default)]
    pub enabled_sip_logs: bool,
}

/// Connection parameters derived from [`WebRtcConfig`].
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct DialerSettings {
    pub server_host: String,
    pub dialer_host: String,
    /// `sip:{diallingUri}@{uriFs}`.
    pub dialer_uri: String,
    pub sip_extension: String,
    pub sip_password: String,
    pub enable_logs: bool,
}

impl From<&WebRtcConfig> for DialerSettings {
    fn from(web_rtc: &WebRtcConfig) -> Self {
        Self {
            server_host: web_rtc.wss_fs.clone(),
            dialer_host: web_rtc.uri_fs.clone(),
            dialer_uri: dialer_uri(&web_rtc.dialling_uri, &web_rtc.uri_fs),
            sip_extension: web_rtc.sip_extension.clone(),
            sip_password: web_rtc.extension_password.clone(),
            enable_logs: web_rtc.enabled_sip_logs,
        }
    }
}

/// Build the SIP URI the dialer calls.
pub fn dialer_uri(dialling_uri: &str, uri_fs: &str) -> String {
    format!("sip:{dialling_uri}@{uri_fs}")
}

/// Immutable widget configuration returned by the config fetch.
///
/// Pass this value explicitly to whatever needs dialer parameters; the SDK
/// keeps no copy of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    /// The response body exactly as received.
    pub raw: Value,
    pub web_rtc: WebRtcConfig,
    pub dialer: DialerSettings,
}

impl WidgetConfig {
    /// Decode a widget configuration body.
    pub fn from_value(raw: Value) -> Result<Self, DecodeError> {
        let response = WidgetConfigResponse::deserialize(&raw)
            .map_err(DecodeError::schema("widget config"))?;
        let dialer = DialerSettings::from(&response.web_rtc);
        Ok(Self {
            raw,
            web_rtc: response.web_rtc,
            dialer,
        })
    }
}

/// Some deployments serve extensions as JSON numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_body() -> Value {
        json!({
            "id": "w-1",
            "theme": { "color": "#fff" },
            "webRtc": {
                "wssFs": "wss://fs.example.com:7443",
                "uriFs": "10.0.0.5",
                "diallingUri": "1001",
                "sipExtension": "2002",
                "extensionPassword": "secret",
                "enabledSipLogs": true
            }
        })
    }

    #[test]
    fn test_dialer_uri_format() {
        assert_eq!(dialer_uri("1001", "10.0.0.5"), "sip:1001@10.0.0.5");
    }

    #[test]
    fn test_widget_config_derives_dialer_settings() {
        let config = WidgetConfig::from_value(sample_body()).unwrap();
        assert_eq!(config.dialer.dialer_uri, "sip:1001@10.0.0.5");
        assert_eq!(config.dialer.server_host, "wss://fs.example.com:7443");
        assert_eq!(config.dialer.dialer_host, "10.0.0.5");
        assert_eq!(config.dialer.sip_extension, "2002");
        assert_eq!(config.dialer.sip_password, "secret");
        assert!(config.dialer.enable_logs);
    }

    #[test]
    fn test_widget_config_keeps_raw_body() {
        let body = sample_body();
        let config = WidgetConfig::from_value(body.clone()).unwrap();
        assert_eq!(config.raw, body);
        assert_eq!(config.raw["theme"]["color"], "#fff");
    }

    #[test]
    fn test_numeric_extension_is_accepted() {
        let body = json!({
            "webRtc": { "uriFs": "fs.local", "diallingUri": 1001, "sipExtension": 2002 }
        });
        let config = WidgetConfig::from_value(body).unwrap();
        assert_eq!(config.dialer.dialer_uri, "sip:1001@fs.local");
        assert_eq!(config.dialer.sip_extension, "2002");
        assert!(!config.dialer.enable_logs);
    }

    #[test]
    fn test_missing_web_rtc_is_a_decode_error() {
        let err = WidgetConfig::from_value(json!({ "id": "w-1" })).unwrap_err();
        assert!(matches!(err, DecodeError::Schema { kind: "widget config", .. }));
        assert!(err.to_string().contains("webRtc"));
    }
}
