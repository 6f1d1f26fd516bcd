//! Lobby input normalization.
//!
//! The lobby form caps names at 20 characters and room codes at 6, and room
//! codes are case-insensitive for players, so they are upper-cased before
//! they leave the client.

use derive_more::{Display, Error};
use tracing::instrument;

/// Longest accepted display name, in characters.
pub const PLAYER_NAME_MAX_LEN: usize = 20;

/// Longest accepted room code, in characters.
pub const ROOM_CODE_MAX_LEN: usize = 6;

/// Rejected lobby input.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum InputError {
    /// Name was blank after trimming.
    #[display("Player name must not be empty")]
    EmptyName,
    /// Room code was blank after trimming.
    #[display("Room code must not be empty")]
    EmptyRoomCode,
}

/// A trimmed, non-empty display name of at most 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct PlayerName(String);

impl PlayerName {
    /// Normalizes raw input. Overlong names are cut to the cap, as the
    /// lobby's input field does.
    #[instrument]
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyName);
        }
        let capped: String = trimmed.chars().take(PLAYER_NAME_MAX_LEN).collect();
        Ok(Self(capped.trim_end().to_string()))
    }

    /// Borrows the name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An upper-cased room code of at most 6 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub struct RoomCode(String);

impl RoomCode {
    /// Normalizes raw input: trim, upper-case, then cap. Upper-casing can
    /// lengthen the text ("ß" becomes "SS"), so the cap is applied last.
    #[instrument]
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyRoomCode);
        }
        Ok(Self(
            trimmed
                .to_uppercase()
                .chars()
                .take(ROOM_CODE_MAX_LEN)
                .collect(),
        ))
    }

    /// Borrows the code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
