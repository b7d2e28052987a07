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

use std::sync::Arc;

use anyhow::Context;
use ccm_widget_cli::cli_args::ChatArgs;
use ccm_widget_sdk::{
    ChatMessage, ChatRequestInput, ConnectOutcome, FileFlagStore, SessionOptions, WidgetEvent,
    WidgetSession,
};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

const END_COMMAND: &str = "/end";
const RESUME_COMMAND: &str = "/resume";

pub async fn chat(args: ChatArgs) -> anyhow::Result<()> {
    let options = SessionOptions::from_env().map_err(anyhow::Error::msg)?;
    let flags = FileFlagStore::from_env();
    info!("Using flag store at {}", flags.path().display());

    let (session, mut events) = WidgetSession::socketio(Arc::new(flags), options);
    let outcome = session
        .establish_connection(args.socket_url.as_str(), &args.service_id, &args.customer_id)
        .await
        .context("failed to connect")?;
    if outcome == ConnectOutcome::Skipped {
        anyhow::bail!("no socket URL given");
    }

    let identifiers = json!({
        "channelCustomerIdentifier": args.customer_id,
        "serviceIdentifier": args.service_id,
    });
    match &args.resume {
        Some(body) => match session.resume_chat(body).await? {
            Some(ack) => println!("{}", json!({ "type": "CHAT_RESUMED", "data": ack })),
            None => warn!("Server sent an empty acknowledgment for CHAT_RESUMED"),
        },
        None => {
            let input = request_input(&args);
            if args.voice {
                session.voice_request(&input).await?;
            } else {
                session.chat_request(&input).await?;
            }
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                println!("{}", serde_json::to_string(&event.to_normalized())?);
                if let WidgetEvent::ChatEnded(_) = event {
                    info!("Chat ended by the remote side");
                    break;
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&session, line.trim(), &identifiers).await {
                            break;
                        }
                    }
                    None => {
                        info!("stdin closed, ending chat");
                        end_chat(&session, &identifiers).await;
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, ending chat");
                end_chat(&session, &identifiers).await;
                break;
            }
        }
    }

    session.disconnect().await?;
    Ok(())
}

fn request_input(args: &ChatArgs) -> ChatRequestInput {
    ChatRequestInput {
        channel_customer_identifier: args.customer_id.clone(),
        service_identifier: args.service_id.clone(),
        browser_device_info: json!({
            "userAgent": format!("ccm-widget-cli/{}", env!("CARGO_PKG_VERSION")),
            "platform": std::env::consts::OS,
        }),
        queue: args.queue.clone().unwrap_or(Value::Null),
        locale: Value::String(args.locale.clone()),
        form_data: args.form_data.clone().unwrap_or(Value::Null),
    }
}

/// Returns `false` once the chat is over.
async fn handle_line(session: &WidgetSession, line: &str, identifiers: &Value) -> bool {
    match line {
        "" => true,
        END_COMMAND => {
            end_chat(session, identifiers).await;
            false
        }
        RESUME_COMMAND => {
            match session.resume_chat(identifiers).await {
                Ok(Some(ack)) => println!("{}", json!({ "type": "CHAT_RESUMED", "data": ack })),
                Ok(None) => warn!("Server sent an empty acknowledgment for CHAT_RESUMED"),
                Err(e) => error!("Resume failed: {e}"),
            }
            true
        }
        _ => {
            let message = match serde_json::from_str::<Value>(line)
                .map_err(anyhow::Error::from)
                .and_then(|value| ChatMessage::from_value(value).map_err(anyhow::Error::from))
            {
                Ok(message) => message,
                Err(e) => {
                    error!("Messages must be JSON objects: {e}");
                    return true;
                }
            };
            match session.send_message(message).await {
                Ok(ack) => info!("Message delivered (code {})", ack.code),
                Err(e) => error!("Message not delivered: {e}"),
            }
            true
        }
    }
}

async fn end_chat(session: &WidgetSession, identifiers: &Value) {
    if let Err(e) = session.chat_end(identifiers).await {
        warn!("Failed to send CHAT_ENDED: {e}");
    }
}
