//! Players and pieces.

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};

/// Seat number of a player (1 moves first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlayerNumber {
    /// Player 1, the room creator.
    One,
    /// Player 2, the joiner.
    Two,
}

impl PlayerNumber {
    /// Numeric value as sent on the wire.
    pub fn as_u8(self) -> u8 {
        match self {
            PlayerNumber::One => 1,
            PlayerNumber::Two => 2,
        }
    }
}

impl std::fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// A player number outside `1..=2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
#[display("invalid player number: {_0}")]
pub struct InvalidPlayerNumber(#[error(not(source))] pub u8);

impl TryFrom<u8> for PlayerNumber {
    type Error = InvalidPlayerNumber;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlayerNumber::One),
            2 => Ok(PlayerNumber::Two),
            other => Err(InvalidPlayerNumber(other)),
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(number: PlayerNumber) -> Self {
        number.as_u8()
    }
}

/// Kind of piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum PieceKind {
    /// The king; reaching the center wins.
    #[serde(rename = "K")]
    #[strum(serialize = "K")]
    King,
    /// A blocking piece.
    #[serde(rename = "P")]
    #[strum(serialize = "P")]
    Pawn,
}

/// A piece and its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    /// Piece marker, `"K"` or `"P"` on the wire.
    #[serde(rename = "type")]
    pub kind: PieceKind,
    /// Owning player.
    pub player: PlayerNumber,
}

impl Piece {
    /// Creates a piece.
    pub fn new(kind: PieceKind, player: PlayerNumber) -> Self {
        Self { kind, player }
    }

    /// Whether this piece is a king.
    pub fn is_king(&self) -> bool {
        self.kind == PieceKind::King
    }
}

/// Opaque player identifier issued by the game service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Borrows the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A registered player as listed in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct PlayerSummary {
    /// Service-issued identifier.
    id: PlayerId,
    /// Display name.
    name: String,
    /// Seat number.
    number: PlayerNumber,
}

impl PlayerSummary {
    /// Creates a player summary.
    pub fn new(id: PlayerId, name: impl Into<String>, number: PlayerNumber) -> Self {
        Self {
            id,
            name: name.into(),
            number,
        }
    }
}

/// The local player of a session. Fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct PlayerInfo {
    /// Service-issued identifier, sent with every move.
    id: PlayerId,
    /// Name the player entered in the lobby.
    name: String,
    /// Seat number assigned by the service.
    number: PlayerNumber,
}

impl PlayerInfo {
    /// Creates the local player record.
    pub fn new(id: PlayerId, name: impl Into<String>, number: PlayerNumber) -> Self {
        Self {
            id,
            name: name.into(),
            number,
        }
    }
}
