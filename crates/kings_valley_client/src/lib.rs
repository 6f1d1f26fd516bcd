//! King's Valley client core.
//!
//! Everything a two-player King's Valley front end needs between the user and
//! the game service, minus the drawing:
//!
//! - **API**: typed calls to the HTTP game service ([`HttpGameApi`])
//! - **Session**: one actor that owns the joined game, the move selection,
//!   the poll timer and the error banner ([`GameClient`])
//! - **Reconciliation**: authoritative snapshots applied newest-issued-first
//!
//! # Example
//!
//! ```no_run
//! use kings_valley::{Cell, PlayerName};
//! use kings_valley_client::{ClientConfig, GameClient, HttpGameApi};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::default();
//! let api = HttpGameApi::new(&config)?;
//! let client = GameClient::spawn(Arc::new(api), &config);
//!
//! let me = client.create_game(PlayerName::parse("Alice")?).await?;
//! println!("Seated as player {}", me.number());
//!
//! client.select_or_move(Cell::new(4, 0).unwrap()).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod error;
mod poller;
mod reconciler;
mod selection;
mod session;
mod surface;
mod wire;

// Crate-level exports - Errors
pub use error::{ApiError, ApiErrorKind, ConfigError};

// Crate-level exports - Configuration
pub use config::{ClientConfig, API_URL_ENV};

// Crate-level exports - Service access
pub use api::{GameApi, HttpGameApi, Joined, MoveAccepted, MoveRequest};

// Crate-level exports - Session building blocks
pub use poller::PollScheduler;
pub use reconciler::{FetchSeq, Reconciler, Reconciliation};
pub use selection::{ClickEffect, Selection};
pub use surface::{
    join_failure_message, move_failure_message, Outcome, Surface, CREATE_FAILED_MESSAGE,
    INVALID_MOVE_MESSAGE, JOIN_FAILED_MESSAGE, MOVE_FAILED_MESSAGE, ROOM_FULL_MESSAGE,
    ROOM_NOT_FOUND_MESSAGE,
};

// Crate-level exports - Session core
pub use session::{ClickOutcome, ClientState, GameClient, SessionView};
