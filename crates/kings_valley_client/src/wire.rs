//! JSON shapes exchanged with the game service.

use crate::error::ApiError;
use chrono::{DateTime, NaiveDateTime};
use kings_valley::{
    Board, Cell, GameId, GameSnapshot, GameStatus, MoveRecord, PlayerId, PlayerInfo, PlayerName,
    PlayerNumber, PlayerSummary, SnapshotError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Game document as served by `GET /game/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct GameDto {
    id: GameId,
    room_code: String,
    status: GameStatus,
    #[serde(default)]
    players: Vec<PlayerDto>,
    game_state: GameStateDto,
}

#[derive(Debug, Clone, Deserialize)]
struct PlayerDto {
    id: PlayerId,
    name: String,
    player_number: PlayerNumber,
}

#[derive(Debug, Clone, Deserialize)]
struct GameStateDto {
    board: Board,
    current_player: PlayerNumber,
    #[serde(default)]
    moves: Vec<MoveDto>,
    #[serde(default)]
    winner: Option<PlayerNumber>,
}

#[derive(Debug, Clone, Deserialize)]
struct MoveDto {
    from_pos: Cell,
    to_pos: Cell,
    player: PlayerNumber,
    #[serde(default)]
    timestamp: Option<String>,
}

impl GameDto {
    /// Validates the document and converts it into a snapshot.
    pub fn into_snapshot(self) -> Result<GameSnapshot, SnapshotError> {
        let players = self
            .players
            .into_iter()
            .map(|p| PlayerSummary::new(p.id, p.name, p.player_number))
            .collect();
        let moves = self
            .game_state
            .moves
            .into_iter()
            .map(|m| {
                let timestamp = m.timestamp.as_deref().and_then(parse_timestamp);
                MoveRecord::new(m.from_pos, m.to_pos, m.player, timestamp)
            })
            .collect();

        GameSnapshot::new(
            self.id,
            self.room_code,
            self.status,
            players,
            self.game_state.board,
            self.game_state.current_player,
            self.game_state.winner,
            moves,
        )
    }
}

/// The service writes naive UTC timestamps; tolerate RFC 3339 too.
fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
        .or_else(|| {
            debug!(raw, "Unparseable move timestamp");
            None
        })
}

/// Response of `POST /game/create` and `POST /game/join`.
#[derive(Debug, Clone, Deserialize)]
pub struct GameResponseDto {
    game: GameDto,
    #[serde(default)]
    your_player_number: Option<PlayerNumber>,
}

impl GameResponseDto {
    /// Resolves the local player and the initial snapshot.
    pub fn into_joined(self, name: &PlayerName) -> Result<(PlayerInfo, GameSnapshot), ApiError> {
        let number = self.your_player_number.ok_or_else(|| {
            warn!("Response is missing your_player_number");
            ApiError::network("Response is missing your_player_number")
        })?;
        let snapshot = self.game.into_snapshot().map_err(|e| {
            warn!(error = %e, "Service returned an inconsistent game");
            ApiError::network(format!("Inconsistent game payload: {}", e))
        })?;
        let seat = snapshot.player(number).ok_or_else(|| {
            warn!(%number, "Assigned seat is not listed among players");
            ApiError::network(format!("Player {} is not listed in the game", number))
        })?;
        let player = PlayerInfo::new(seat.id().clone(), name.as_str(), number);
        Ok((player, snapshot))
    }
}

/// Body of `POST /game/create`.
#[derive(Debug, Serialize)]
pub struct CreateGameBody<'a> {
    /// Display name of the creator.
    pub player_name: &'a str,
}

/// Body of `POST /game/join`.
#[derive(Debug, Serialize)]
pub struct JoinGameBody<'a> {
    /// Upper-cased room code.
    pub room_code: &'a str,
    /// Display name of the joiner.
    pub player_name: &'a str,
}

/// Body of `POST /game/move`.
#[derive(Debug, Serialize)]
pub struct MoveBody<'a> {
    /// Target game.
    pub game_id: &'a str,
    /// Moving player.
    pub player_id: &'a str,
    /// Origin row.
    pub from_row: usize,
    /// Origin column.
    pub from_col: usize,
    /// Destination row.
    pub to_row: usize,
    /// Destination column.
    pub to_col: usize,
}

/// Response of `POST /game/move`.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveResponseDto {
    /// Whether the service applied the move.
    pub success: bool,
    /// Winner, when the move ended the game.
    #[serde(default)]
    pub winner: Option<PlayerNumber>,
}

/// Response of `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthDto {
    /// Greeting from the service.
    pub message: String,
}

/// Error body produced by the service for 4xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetailDto {
    /// Human-readable reason.
    pub detail: String,
}
