use std::time::Duration;
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use oracles_core::{ChatClient, ChatRole, Config, Session};
use tracing::{info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::{App, PendingReply};
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "oracles", version)]
#[command(about = "Terminal chat client for a local inference backend")]
struct Cli {
    /// Backend base URL (overrides ORACLES_API_BASE_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a single query and print the reply
    Ask {
        /// Your question
        query: String,
    },
    /// Show the effective backend, or persist a new base URL
    Config {
        /// Base URL to save in the config file
        #[arg(long)]
        set_base_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = logging::init(cli.verbose)?;

    let config = Config::load().unwrap_or_else(|err| {
        warn!(error = %err, "ignoring unreadable config file");
        Config::new()
    });
    let base_url = config.resolve_base_url(cli.base_url.as_deref());
    let client = ChatClient::new(&base_url);
    info!(endpoint = %client.endpoint(), log = %log_path.display(), "starting");

    match cli.command {
        None => run_tui(client).await,
        Some(Commands::Ask { query }) => ask(&client, &query).await,
        Some(Commands::Config { set_base_url }) => show_or_save_config(&client, set_base_url),
    }
}

async fn run_tui(client: ChatClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut app = App::new(client);
    let mut events = EventHandler::new(Duration::from_millis(300));

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        tokio::select! {
            event = events.next() => match event {
                Some(event) => handler::handle_event(app, event)?,
                None => break,
            },
            outcome = wait_for_reply(&mut app.pending) => app.settle(outcome),
        }
    }

    Ok(())
}

/// Resolves when the in-flight request finishes; pends forever when idle.
async fn wait_for_reply(
    pending: &mut Option<PendingReply>,
) -> Result<Result<oracles_core::ChatResponse, oracles_core::ChatError>, tokio::task::JoinError> {
    match pending.as_mut() {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

async fn ask(client: &ChatClient, query: &str) -> Result<()> {
    let mut session = Session::new();
    session.set_draft(query);

    if !session.submit(client).await {
        return Err(anyhow!("Nothing to send: the query is blank"));
    }

    if let Some(error) = session.error() {
        return Err(anyhow!("{}", error));
    }

    if let Some(turn) = session.turns().last().filter(|t| t.role == ChatRole::Assistant) {
        println!("{}", turn.content);
    }
    Ok(())
}

fn show_or_save_config(client: &ChatClient, set_base_url: Option<String>) -> Result<()> {
    match set_base_url {
        Some(url) => {
            Config::save_base_url(&url)?;
            println!("Saved base URL {} to {}", url, Config::config_path()?.display());
        }
        None => {
            println!("Config file: {}", Config::config_path()?.display());
            println!("Endpoint:    {}", client.endpoint());
        }
    }
    Ok(())
}
