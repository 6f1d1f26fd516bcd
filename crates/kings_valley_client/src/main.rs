//! King's Valley - terminal client
//!
//! Creates or joins a room on the game service and plays it from stdin.

#![warn(missing_docs)]

mod cli;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command, PlayInput};
use kings_valley::{Cell, PlayerName, RoomCode};
use kings_valley_client::{ClickOutcome, ClientConfig, GameApi, GameClient, HttpGameApi};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    initialize_tracing()?;

    let config = ClientConfig::resolve(cli.config.as_deref(), cli.api_url.clone())?;
    info!(api_url = %config.api_url(), "Configuration loaded");
    let api = Arc::new(HttpGameApi::new(&config)?);

    match cli.command {
        Command::Ping => run_ping(api.as_ref()).await,
        Command::Create { name } => {
            let name = PlayerName::parse(&name)?;
            let client = GameClient::spawn(api, &config);
            if let Err(err) = client.create_game(name).await {
                print!("{}", render::render(&client.state()));
                return Err(err).context("Could not create a room");
            }
            play(client).await
        }
        Command::Join { room, name } => {
            let room = RoomCode::parse(&room)?;
            let name = PlayerName::parse(&name)?;
            let client = GameClient::spawn(api, &config);
            if let Err(err) = client.join_game(room, name).await {
                print!("{}", render::render(&client.state()));
                return Err(err).context("Could not join the room");
            }
            play(client).await
        }
    }
}

/// Logs go to a file so they do not tear up the board.
fn initialize_tracing() -> Result<()> {
    let log_file = std::fs::File::create("kings_valley.log")?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[instrument(skip_all)]
async fn run_ping(api: &dyn GameApi) -> Result<()> {
    let message = api.ping().await.context("Game service unreachable")?;
    println!("{message}");
    Ok(())
}

/// Reads commands from stdin and redraws whenever the state changes.
#[instrument(skip_all)]
async fn play(client: GameClient) -> Result<()> {
    let mut updates = client.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    print!("{}", render::render(&updates.borrow_and_update()));
    print_help();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    warn!("Session core stopped");
                    break;
                }
                print!("{}", render::render(&updates.borrow_and_update()));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match PlayInput::parse(&line) {
                    PlayInput::Click(row, col) => match Cell::new(row, col) {
                        Some(cell) => report_click(client.select_or_move(cell).await),
                        None => println!("Rows and columns run from 0 to 4."),
                    },
                    PlayInput::Refresh => {
                        if let Err(err) = client.refresh().await {
                            println!("Refresh failed: {err}");
                        }
                    }
                    PlayInput::Leave => break,
                    PlayInput::Unknown => print_help(),
                }
            }
        }
    }

    client.leave_game().await;
    client.shutdown();
    info!("Left the game");
    Ok(())
}

fn report_click(outcome: ClickOutcome) {
    match outcome {
        ClickOutcome::Ignored => println!("Nothing to do there."),
        ClickOutcome::Selected(cell) => println!("Selected {cell}."),
        ClickOutcome::Deselected => println!("Selection cleared."),
        ClickOutcome::Moved { .. } | ClickOutcome::Rejected(_) => {}
    }
}

fn print_help() {
    println!("Commands: `ROW COL` to click a cell, `refresh`, `leave`.");
}
