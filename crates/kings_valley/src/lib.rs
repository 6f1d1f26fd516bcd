//! King's Valley game types.
//!
//! Pure data shared by the client core: pieces, the 5×5 board, game status,
//! players and the validated [`GameSnapshot`]. There is no rule engine here;
//! legality and win detection belong to the game service.
//!
//! # Example
//!
//! ```
//! use kings_valley::{Cell, PlayerNumber, RoomCode};
//!
//! let code = RoomCode::parse(" abc123 ").unwrap();
//! assert_eq!(code.as_str(), "ABC123");
//! assert_eq!(Cell::CENTER, Cell::new(2, 2).unwrap());
//! assert_eq!(PlayerNumber::Two.to_string(), "2");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod input;
mod player;
mod snapshot;
mod status;

pub use board::{Board, BoardShapeError, Cell, BOARD_SIZE};
pub use input::{InputError, PlayerName, RoomCode, PLAYER_NAME_MAX_LEN, ROOM_CODE_MAX_LEN};
pub use player::{
    InvalidPlayerNumber, Piece, PieceKind, PlayerId, PlayerInfo, PlayerNumber, PlayerSummary,
};
pub use snapshot::{GameId, GameSnapshot, MoveRecord, SnapshotError};
pub use status::GameStatus;
