use clap::Parser;
use is_terminal::IsTerminal;
use std::io;
use std::process;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod commands;
mod config;
mod core;
mod display;
mod input;
mod progress;
mod providers;
mod utils;

use crate::app::{Application, SessionOptions};
use crate::cli::Args;
use crate::commands::CommandDispatcher;
use crate::config::{Config, expand_path};
use crate::core::clipboard::{ClipboardSink, CommandClipboard};
use crate::core::error::{AppError, exitcode};
use crate::input::EditorInput;
use crate::providers::chat_client::ChatClient;

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("PROMPT_BUILDER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

async fn run(args: Args) -> Result<(), AppError> {
    let config_path = match &args.config {
        Some(path) => expand_path(&path.to_string_lossy()),
        None => Config::default_path(),
    };
    debug!(path = %config_path.display(), "loading config");

    let settings = Config::load(&config_path)?.resolve(args.model.as_deref())?;
    info!(
        host = %settings.host,
        model = %settings.model,
        format = ?settings.stream_format,
        "resolved settings"
    );

    let clipboard: Option<Arc<dyn ClipboardSink>> = if args.no_copy {
        None
    } else {
        CommandClipboard::detect(settings.clipboard_cmd.as_deref())
            .map(|c| Arc::new(c) as Arc<dyn ClipboardSink>)
    };
    let dispatcher = CommandDispatcher::new(clipboard);

    let client = ChatClient::new(
        settings.host,
        settings.api_key,
        settings.model,
        settings.stream_format,
    );

    let options = SessionOptions {
        interactive: io::stdout().is_terminal(),
        quiet: args.quiet,
    };

    let mut app = Application::new(
        Box::new(client),
        dispatcher.clone(),
        settings.system_prompt,
        options,
    );
    if options.interactive {
        app = app.with_input(Box::new(EditorInput::new(dispatcher)?));
    }

    app.run(&args.idea).await
}

#[tokio::main]
async fn main() {
    init_logging();
    let args = Args::parse();

    let result = tokio::select! {
        result = run(args) => result,
        _ = tokio::signal::ctrl_c() => {
            debug!("interrupted");
            process::exit(exitcode::INTERRUPTED);
        }
    };

    if let Err(e) = result {
        display::display_fatal(&e);
        process::exit(e.exit_code());
    }
}
