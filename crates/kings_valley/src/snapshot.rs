//! Authoritative game snapshot.
//!
//! A [`GameSnapshot`] is the complete state of a room as reported by the game
//! service. Clients never patch one in place; every fetch produces a new
//! snapshot that replaces the previous one wholesale.

use crate::board::{Board, Cell};
use crate::player::{PlayerNumber, PlayerSummary};
use crate::status::GameStatus;
use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Opaque game identifier issued by the game service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Borrows the identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One accepted move from the room's history.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct MoveRecord {
    /// Origin square.
    from: Cell,
    /// Destination square.
    to: Cell,
    /// Who moved.
    player: PlayerNumber,
    /// Server time of the move, when reported.
    timestamp: Option<NaiveDateTime>,
}

impl MoveRecord {
    /// Creates a move record.
    pub fn new(
        from: Cell,
        to: Cell,
        player: PlayerNumber,
        timestamp: Option<NaiveDateTime>,
    ) -> Self {
        Self {
            from,
            to,
            player,
            timestamp,
        }
    }
}

/// Snapshot that breaks a game invariant.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum SnapshotError {
    /// A winner was reported for an unfinished game.
    #[display("winner reported while status is {_0}")]
    WinnerBeforeFinish(#[error(not(source))] GameStatus),
    /// A finished game without a winner.
    #[display("finished game has no winner")]
    FinishedWithoutWinner,
    /// More than two players listed.
    #[display("{_0} players listed, at most 2 allowed")]
    TooManyPlayers(#[error(not(source))] usize),
    /// Two players share a seat number.
    #[display("player number {_0} is listed twice")]
    DuplicateSeat(#[error(not(source))] PlayerNumber),
    /// The player to move is not seated.
    #[display("current player {_0} is not a registered player")]
    UnseatedCurrentPlayer(#[error(not(source))] PlayerNumber),
}

/// Complete view of a room at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameSnapshot {
    /// Game identifier.
    id: GameId,
    /// Public code used to join.
    room_code: String,
    /// Lifecycle status.
    status: GameStatus,
    /// Seated players in join order.
    players: Vec<PlayerSummary>,
    /// Board contents.
    board: Board,
    /// Player to move.
    current_player: PlayerNumber,
    /// Winner, present exactly when finished.
    winner: Option<PlayerNumber>,
    /// Accepted moves, oldest first.
    moves: Vec<MoveRecord>,
}

impl GameSnapshot {
    /// Builds a snapshot, checking the cross-field invariants.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(players, board, moves), fields(game_id = %id, status = %status))]
    pub fn new(
        id: GameId,
        room_code: String,
        status: GameStatus,
        players: Vec<PlayerSummary>,
        board: Board,
        current_player: PlayerNumber,
        winner: Option<PlayerNumber>,
        moves: Vec<MoveRecord>,
    ) -> Result<Self, SnapshotError> {
        match (status, winner) {
            (GameStatus::Finished, None) => return Err(SnapshotError::FinishedWithoutWinner),
            (GameStatus::Waiting | GameStatus::InProgress, Some(_)) => {
                return Err(SnapshotError::WinnerBeforeFinish(status));
            }
            _ => {}
        }

        if players.len() > 2 {
            return Err(SnapshotError::TooManyPlayers(players.len()));
        }
        if let [first, second] = players.as_slice()
            && first.number() == second.number()
        {
            return Err(SnapshotError::DuplicateSeat(*first.number()));
        }
        if status == GameStatus::InProgress
            && !players.iter().any(|p| *p.number() == current_player)
        {
            return Err(SnapshotError::UnseatedCurrentPlayer(current_player));
        }

        Ok(Self {
            id,
            room_code,
            status,
            players,
            board,
            current_player,
            winner,
            moves,
        })
    }

    /// The seated player with `number`, if any.
    pub fn player(&self, number: PlayerNumber) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| *p.number() == number)
    }

    /// Whether it is `number`'s turn (regardless of status).
    pub fn is_turn_of(&self, number: PlayerNumber) -> bool {
        self.current_player == number
    }

    /// Whether `number` may interact with the board right now.
    pub fn is_interactive_for(&self, number: PlayerNumber) -> bool {
        self.status == GameStatus::InProgress && self.is_turn_of(number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerId;

    fn seat(id: &str, number: PlayerNumber) -> PlayerSummary {
        PlayerSummary::new(PlayerId::from(id), id, number)
    }

    fn build(
        status: GameStatus,
        players: Vec<PlayerSummary>,
        winner: Option<PlayerNumber>,
    ) -> Result<GameSnapshot, SnapshotError> {
        GameSnapshot::new(
            GameId::from("g1"),
            "ABC123".to_string(),
            status,
            players,
            Board::opening(),
            PlayerNumber::One,
            winner,
            Vec::new(),
        )
    }

    #[test]
    fn winner_iff_finished() {
        let both = vec![seat("a", PlayerNumber::One), seat("b", PlayerNumber::Two)];
        assert!(build(GameStatus::Finished, both.clone(), Some(PlayerNumber::Two)).is_ok());
        assert_eq!(
            build(GameStatus::Finished, both.clone(), None),
            Err(SnapshotError::FinishedWithoutWinner)
        );
        assert_eq!(
            build(GameStatus::InProgress, both, Some(PlayerNumber::One)),
            Err(SnapshotError::WinnerBeforeFinish(GameStatus::InProgress))
        );
    }

    #[test]
    fn seats_are_unique() {
        let players = vec![seat("a", PlayerNumber::One), seat("b", PlayerNumber::One)];
        assert_eq!(
            build(GameStatus::InProgress, players, None),
            Err(SnapshotError::DuplicateSeat(PlayerNumber::One))
        );
    }

    #[test]
    fn in_progress_requires_seated_mover() {
        let only_two = vec![seat("b", PlayerNumber::Two)];
        assert_eq!(
            build(GameStatus::InProgress, only_two, None),
            Err(SnapshotError::UnseatedCurrentPlayer(PlayerNumber::One))
        );
    }

    #[test]
    fn waiting_room_is_not_interactive() {
        let snapshot = build(GameStatus::Waiting, vec![seat("a", PlayerNumber::One)], None).unwrap();
        assert!(snapshot.is_turn_of(PlayerNumber::One));
        assert!(!snapshot.is_interactive_for(PlayerNumber::One));
        assert_eq!(snapshot.player(PlayerNumber::One).map(|p| p.name().as_str()), Some("a"));
        assert!(snapshot.player(PlayerNumber::Two).is_none());
    }
}
