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

use anyhow::Context;
use ccm_widget_cli::cli_args::{ConfigArgs, FormArgs, ValidationArgs};
use ccm_widget_client::ApiClient;
use tracing::debug;

pub async fn show_config(args: ConfigArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(args.ccm_url.as_str());
    let config = client
        .widget_config(&args.widget_id)
        .await
        .with_context(|| format!("failed to fetch widget config '{}'", args.widget_id))?;
    debug!("Widget config: {:?}", config.web_rtc);

    let output = if args.raw {
        serde_json::to_string_pretty(&config.raw)?
    } else {
        serde_json::to_string_pretty(&config.dialer)?
    };
    println!("{output}");
    Ok(())
}

pub async fn show_form(args: FormArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(args.form_url.as_str());
    let form = client
        .pre_chat_form(&args.form_id)
        .await
        .with_context(|| format!("failed to fetch form '{}'", args.form_id))?;
    println!("{}", serde_json::to_string_pretty(form.as_value())?);
    Ok(())
}

pub async fn show_validation(args: ValidationArgs) -> anyhow::Result<()> {
    let client = ApiClient::new(args.form_url.as_str());
    let rules = client
        .form_validation()
        .await
        .context("failed to fetch form validation")?;
    println!("{}", serde_json::to_string_pretty(rules.as_value())?);
    Ok(())
}
