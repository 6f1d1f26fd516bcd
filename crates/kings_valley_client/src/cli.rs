//! Command-line interface for kings_valley.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// King's Valley - play a networked game of King's Valley from the terminal
#[derive(Parser, Debug)]
#[command(name = "kings_valley")]
#[command(about = "Terminal client for the King's Valley game service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML client configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Game service base URL (overrides config file and environment)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a new room and play as player 1
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,
    },

    /// Join an existing room by code
    Join {
        /// Six-character room code
        #[arg(short, long)]
        room: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },

    /// Check that the game service is reachable
    Ping,
}

/// A line typed during play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayInput {
    /// Click the cell at row, column.
    Click(usize, usize),
    /// Fetch the latest state now.
    Refresh,
    /// Leave the room and exit.
    Leave,
    /// Anything else.
    Unknown,
}

impl PlayInput {
    /// Parses one input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "refresh" | "r" => return PlayInput::Refresh,
            "leave" | "quit" | "q" => return PlayInput::Leave,
            _ => {}
        }

        let mut parts = line.split(|c: char| c.is_whitespace() || c == ',').filter(|p| !p.is_empty());
        match (parts.next(), parts.next(), parts.next()) {
            (Some(row), Some(col), None) => match (row.parse(), col.parse()) {
                (Ok(row), Ok(col)) => PlayInput::Click(row, col),
                _ => PlayInput::Unknown,
            },
            _ => PlayInput::Unknown,
        }
    }
}
