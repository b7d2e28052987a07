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

use clap::Parser;
mod modes;

use ccm_widget_cli::cli_args::{Mode, Opt};
use modes::chat::chat;
use modes::fetch::{show_config, show_form, show_validation};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try_init also routes the SDK crates' `log` records into tracing.
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish()
        .try_init()?;

    let opt = Opt::parse();

    match opt.mode {
        Mode::Config(args) => show_config(args).await?,
        Mode::Form(args) => show_form(args).await?,
        Mode::Validation(args) => show_validation(args).await?,
        Mode::Chat(args) => chat(args).await?,
    };

    Ok(())
}
