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

use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Contact-center widget CLI
///
/// Fetches the widget configuration and pre-chat forms, and drives a chat
/// session from the terminal. Every event from the backend is printed as a
/// JSON line.
#[derive(Parser, Debug)]
#[clap(name = "ccm-widget")]
pub struct Opt {
    #[clap(subcommand)]
    pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
    /// Fetch the widget configuration and print the derived dialer settings.
    Config(ConfigArgs),

    /// Fetch a pre-chat form definition.
    Form(FormArgs),

    /// Fetch the form validation rules.
    Validation(ValidationArgs),

    /// Open a chat (or voice) session and exchange messages over stdin.
    Chat(ChatArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Base URL of the CCM API.
    #[clap(long = "ccm-url", env = "CCM_URL")]
    pub ccm_url: Url,

    #[clap(long = "widget-id", env = "WIDGET_ID")]
    pub widget_id: String,

    /// Print the configuration body as served instead of the dialer settings.
    #[clap(long = "raw")]
    pub raw: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FormArgs {
    /// Base URL of the forms API.
    #[clap(long = "form-url", env = "FORM_URL")]
    pub form_url: Url,

    #[clap(long = "form-id")]
    pub form_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct ValidationArgs {
    /// Base URL of the forms API.
    #[clap(long = "form-url", env = "FORM_URL")]
    pub form_url: Url,
}

#[derive(Args, Debug, Clone)]
pub struct ChatArgs {
    /// Socket URL, e.g. `https://ccm.example.com/chat`.
    #[clap(long = "socket-url", env = "WIDGET_SOCKET_URL")]
    pub socket_url: Url,

    #[clap(long = "service-id", env = "WIDGET_SERVICE_ID")]
    pub service_id: String,

    #[clap(long = "customer-id")]
    pub customer_id: String,

    /// Request a voice call instead of a chat.
    #[clap(long = "voice")]
    pub voice: bool,

    #[clap(long = "locale", default_value = "en")]
    pub locale: String,

    /// Queue to route the request to, as JSON.
    #[clap(long = "queue", value_parser = parse_json)]
    pub queue: Option<Value>,

    /// Pre-chat form answers, as JSON.
    #[clap(long = "form-data", value_parser = parse_json)]
    pub form_data: Option<Value>,

    /// Resume an existing conversation instead of requesting a new one.
    /// The value is sent as the CHAT_RESUMED body, as JSON.
    #[clap(long = "resume", value_parser = parse_json)]
    pub resume: Option<Value>,
}

#[derive(Error, Debug)]
pub enum ParseJsonError {
    #[error("Invalid JSON value: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

fn parse_json(s: &str) -> Result<Value, ParseJsonError> {
    Ok(serde_json::from_str(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Opt::command().debug_assert();
    }

    #[test]
    fn test_chat_args_parse_json_options() {
        let opt = Opt::try_parse_from([
            "ccm-widget",
            "chat",
            "--socket-url",
            "https://ccm.example.com/chat",
            "--service-id",
            "s1",
            "--customer-id",
            "c1",
            "--voice",
            "--queue",
            r#"{"name":"support"}"#,
        ])
        .unwrap();
        let Mode::Chat(chat) = opt.mode else {
            panic!("expected chat mode");
        };
        assert!(chat.voice);
        assert_eq!(chat.locale, "en");
        assert_eq!(chat.queue, Some(serde_json::json!({ "name": "support" })));
        assert_eq!(chat.form_data, None);
    }

    #[test]
    fn test_invalid_json_option_is_rejected() {
        let result = Opt::try_parse_from([
            "ccm-widget",
            "chat",
            "--socket-url",
            "https://ccm.example.com/chat",
            "--service-id",
            "s1",
            "--customer-id",
            "c1",
            "--form-data",
            "{not json",
        ]);
        assert!(result.is_err());
    }
}
