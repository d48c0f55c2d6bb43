use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, ConversationController, ConversationEvent, HttpScenarioChatService, Settings,
};
use shared::domain::Scenario;
use tokio::{
    io::{self, AsyncBufReadExt, BufReader, Lines, Stdin},
    sync::broadcast::{self, error::RecvError},
};
use tracing_subscriber::EnvFilter;

mod render;

const QUIT_COMMAND: &str = "/quit";

#[derive(Parser, Debug)]
#[command(name = "phishguard", about = "Social-engineering training chats")]
struct Args {
    /// Scenario chat service, e.g. http://10.0.2.2:8000
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Per-request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,
    /// Settings file (defaults to ./phishguard.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List training scenarios
    Scenarios,
    /// Open a conversation with a simulated attacker
    Chat { scenario: Option<Scenario> },
    /// Check that the chat service is reachable
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        settings.base_url = base_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.request_timeout_secs = timeout_secs;
    }

    let mut stdin = BufReader::new(io::stdin()).lines();
    match args.command.unwrap_or(Command::Chat { scenario: None }) {
        Command::Scenarios => println!("{}", render::picker()),
        Command::Chat { scenario } => {
            let scenario = match scenario {
                Some(scenario) => scenario,
                None => prompt_for_scenario(&mut stdin).await?,
            };
            run_chat(&settings, scenario, &mut stdin).await?;
        }
        Command::Status => print_status(&settings).await?,
    }

    Ok(())
}

async fn prompt_for_scenario(stdin: &mut Lines<BufReader<Stdin>>) -> Result<Scenario> {
    println!("{}\n", render::picker());
    loop {
        println!("Pick a scenario:");
        let Some(answer) = stdin.next_line().await? else {
            bail!("no scenario selected");
        };
        match render::pick(&answer) {
            Some(scenario) => return Ok(scenario),
            None => println!("'{}' is not an available scenario.", answer.trim()),
        }
    }
}

async fn run_chat(
    settings: &Settings,
    scenario: Scenario,
    stdin: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    let service = Arc::new(HttpScenarioChatService::new(settings)?);
    let conversation = ConversationController::new(scenario, service)?;
    let renderer = tokio::spawn(render_events(conversation.subscribe_events()));

    println!("{}", render::chat_header(scenario));
    conversation.initialize().await;

    while let Some(line) = stdin.next_line().await? {
        if line.trim() == QUIT_COMMAND {
            break;
        }
        // Input stays editable while a reply is outstanding: stdin is only read
        // again once the previous submission settles, so typed-ahead lines are
        // queued rather than rejected.
        conversation.set_draft(line).await;
        let outcome = conversation.submit_draft().await;
        if let Some(notice) = render::rejection_notice(outcome) {
            println!("{notice}");
        }
    }

    drop(conversation);
    renderer.await.context("renderer task failed")?;
    Ok(())
}

async fn render_events(mut events: broadcast::Receiver<ConversationEvent>) {
    loop {
        match events.recv().await {
            Ok(ConversationEvent::MessageAppended(message)) => {
                println!("{}", render::message(&message))
            }
            Ok(ConversationEvent::PendingChanged(true)) => {
                println!("{}", render::TYPING_INDICATOR)
            }
            Ok(ConversationEvent::PendingChanged(false)) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "renderer fell behind conversation events")
            }
            Err(RecvError::Closed) => break,
        }
    }
}

async fn print_status(settings: &Settings) -> Result<()> {
    let service = HttpScenarioChatService::new(settings)?;
    let status = service
        .status()
        .await
        .with_context(|| format!("chat service at {} is unreachable", service.base_url()))?;
    println!("{}: {}", service.base_url(), status.status);
    if let Some(mode) = status.mode {
        println!("mode: {mode}");
    }
    Ok(())
}
