//! The 5×5 board.

use crate::player::{Piece, PieceKind, PlayerNumber};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const BOARD_SIZE: usize = 5;

/// A square on the board, always within bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCell", into = "RawCell")]
pub struct Cell {
    row: usize,
    col: usize,
}

impl Cell {
    /// The center square. Moving a king here wins the game.
    pub const CENTER: Cell = Cell { row: 2, col: 2 };

    /// Creates a cell, or `None` when outside the board.
    pub fn new(row: usize, col: usize) -> Option<Self> {
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some(Self { row, col })
    }

    /// Row index, top to bottom.
    pub fn row(&self) -> usize {
        self.row
    }

    /// Column index, left to right.
    pub fn col(&self) -> usize {
        self.col
    }

    /// Whether this is the center square.
    pub fn is_center(&self) -> bool {
        *self == Self::CENTER
    }

    /// Iterates over every cell in row-major order.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..BOARD_SIZE).flat_map(|row| (0..BOARD_SIZE).map(move |col| Cell { row, col }))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Serialize, Deserialize)]
struct RawCell {
    row: usize,
    col: usize,
}

impl TryFrom<RawCell> for Cell {
    type Error = BoardShapeError;

    fn try_from(raw: RawCell) -> Result<Self, Self::Error> {
        Cell::new(raw.row, raw.col).ok_or(BoardShapeError::CellOutOfBounds {
            row: raw.row,
            col: raw.col,
        })
    }
}

impl From<Cell> for RawCell {
    fn from(cell: Cell) -> Self {
        RawCell {
            row: cell.row,
            col: cell.col,
        }
    }
}

/// Board payload that is not a 5×5 grid.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardShapeError {
    /// Wrong number of rows.
    #[display("board has {_0} rows, expected {BOARD_SIZE}")]
    Rows(#[error(not(source))] usize),
    /// A row with the wrong number of columns.
    #[display("board row {row} has {len} columns, expected {BOARD_SIZE}")]
    Columns {
        /// Offending row.
        row: usize,
        /// Its length.
        len: usize,
    },
    /// A cell coordinate outside the board.
    #[display("cell ({row}, {col}) is outside the board")]
    CellOutOfBounds {
        /// Row given.
        row: usize,
        /// Column given.
        col: usize,
    },
}

type Grid = Vec<Vec<Option<Piece>>>;

/// Board contents as last reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Grid", into = "Grid")]
pub struct Board {
    squares: [[Option<Piece>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The opening layout: player 1 on the bottom row, player 2 on the top
    /// row, kings in the middle column.
    pub fn opening() -> Self {
        let mut board = Self::empty();
        for col in 0..BOARD_SIZE {
            let kind = if col == 2 { PieceKind::King } else { PieceKind::Pawn };
            board.squares[0][col] = Some(Piece::new(kind, PlayerNumber::Two));
            board.squares[BOARD_SIZE - 1][col] = Some(Piece::new(kind, PlayerNumber::One));
        }
        board
    }

    /// Returns the piece on `cell`, if any.
    pub fn get(&self, cell: Cell) -> Option<Piece> {
        self.squares[cell.row][cell.col]
    }

    /// Places (or clears) a piece, returning the board for chaining.
    pub fn with(mut self, cell: Cell, piece: Option<Piece>) -> Self {
        self.squares[cell.row][cell.col] = piece;
        self
    }

    /// Whether `cell` holds a piece owned by `player`.
    pub fn is_owned_by(&self, cell: Cell, player: PlayerNumber) -> bool {
        self.get(cell).is_some_and(|piece| piece.player == player)
    }

    /// Location of `player`'s king, if on the board.
    pub fn king_of(&self, player: PlayerNumber) -> Option<Cell> {
        self.pieces()
            .find(|(_, piece)| piece.is_king() && piece.player == player)
            .map(|(cell, _)| cell)
    }

    /// Iterates over occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Cell, Piece)> + '_ {
        Cell::all().filter_map(|cell| self.get(cell).map(|piece| (cell, piece)))
    }
}

impl TryFrom<Grid> for Board {
    type Error = BoardShapeError;

    fn try_from(grid: Grid) -> Result<Self, Self::Error> {
        if grid.len() != BOARD_SIZE {
            return Err(BoardShapeError::Rows(grid.len()));
        }
        let mut squares = [[None; BOARD_SIZE]; BOARD_SIZE];
        for (row, cells) in grid.into_iter().enumerate() {
            if cells.len() != BOARD_SIZE {
                return Err(BoardShapeError::Columns {
                    row,
                    len: cells.len(),
                });
            }
            for (col, piece) in cells.into_iter().enumerate() {
                squares[row][col] = piece;
            }
        }
        Ok(Self { squares })
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.squares.iter().map(|row| row.to_vec()).collect()
    }
}
