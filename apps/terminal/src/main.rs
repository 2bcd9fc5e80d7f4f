use std::{io, path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, ChatController, HttpTransport, SessionEvent, Transport, DEFAULT_CONFIG_PATH,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod view;

use view::{parse_command, Command, Labels, TerminalView};

#[derive(Parser, Debug)]
#[command(name = "jokester", about = "Chat with Jokester Bot from the terminal")]
struct Args {
    /// TOML file with `api_url`, `greeting` and `error_text`.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    #[arg(long)]
    greeting: Option<String>,
    #[arg(long)]
    error_text: Option<String>,
    #[arg(long, default_value = "You")]
    user_label: String,
    #[arg(long, default_value = "Jokester Bot")]
    bot_label: String,
    /// Per-character delay when printing bot turns; 0 prints them at once.
    #[arg(long, default_value_t = 15)]
    typing_delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config).with_context(|| {
        format!(
            "failed to load chat settings from '{}'",
            args.config.display()
        )
    })?;
    if let Some(v) = args.api_url {
        settings.api_url = v;
    }
    if let Some(v) = args.greeting {
        settings.greeting = v;
    }
    if let Some(v) = args.error_text {
        settings.error_text = v;
    }
    let api_url = settings.validate().context("invalid chat settings")?;
    info!(%api_url, "starting chat session");

    let controller = Arc::new(ChatController::from_settings(
        HttpTransport::new(api_url),
        &settings,
    ));
    let view = TerminalView::new(
        Labels {
            user: args.user_label,
            bot: args.bot_label,
        },
        Duration::from_millis(args.typing_delay_ms),
    );
    run(controller, view).await
}

async fn run<T>(controller: Arc<ChatController<T>>, mut view: TerminalView) -> Result<()>
where
    T: Transport + 'static,
{
    let mut stdout = io::stdout();
    view.render(&controller.snapshot().await, &mut stdout).await?;
    view.print_intro(&mut stdout)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        view.prompt(&mut stdout)?;
        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            debug!("stdin closed");
            break;
        };

        match parse_command(&line) {
            Command::Quit => {
                view.say_goodbye(&mut stdout)?;
                break;
            }
            Command::Help => {
                view.print_help(&mut stdout)?;
                continue;
            }
            Command::Fact => {
                view.print_fact(&mut rand::rng(), &mut stdout)?;
                continue;
            }
            Command::Message => {}
        }

        controller.set_draft(line).await;
        if !controller.snapshot().await.can_submit() {
            view.print_blank_hint(&mut stdout)?;
            continue;
        }

        let mut events = controller.subscribe();
        let mut submission = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.submit().await }
        });

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(SessionEvent::DraftChanged) => {}
                    Ok(_) | Err(RecvError::Lagged(_)) => {
                        view.render(&controller.snapshot().await, &mut stdout).await?;
                    }
                    Err(RecvError::Closed) => break,
                },
                joined = &mut submission => {
                    let outcome = joined.context("chat submission task failed")?;
                    debug!(accepted = outcome.was_accepted(), "submission finished");
                    break;
                }
            }
        }
        view.render(&controller.snapshot().await, &mut stdout).await?;
    }

    Ok(())
}
