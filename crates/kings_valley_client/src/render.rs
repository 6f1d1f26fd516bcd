//! Plain-text rendering of the client state.

use kings_valley::{Board, Cell, GameSnapshot, GameStatus, BOARD_SIZE};
use kings_valley_client::{ClientState, SessionView};
use std::fmt::Write;

/// Renders the whole screen for `state`.
pub fn render(state: &ClientState) -> String {
    let mut out = String::new();
    match state.session() {
        Some(session) => render_session(&mut out, session),
        None => {
            out.push_str("Not in a game.\n");
        }
    }
    if let Some(message) = state.lobby_error() {
        let _ = writeln!(out, "! {message}");
    }
    out
}

fn render_session(out: &mut String, session: &SessionView) {
    let snapshot = session.snapshot();
    let me = session.player();
    let _ = writeln!(
        out,
        "Room {} | You are {} (player {})",
        snapshot.room_code(),
        me.name(),
        me.number()
    );
    out.push_str(&render_board(snapshot.board(), session.selection().selected()));
    let _ = writeln!(out, "{}", status_line(snapshot));
    if let Some(error) = session.error() {
        let _ = writeln!(out, "! {error}");
    }
    if let Some(outcome) = session.outcome() {
        let _ = writeln!(out, "{outcome}");
    }
}

/// The turn or lifecycle line under the board.
pub fn status_line(snapshot: &GameSnapshot) -> String {
    match snapshot.status() {
        GameStatus::Waiting => "Waiting for second player...".to_string(),
        GameStatus::InProgress => format!("Player {}'s turn", snapshot.current_player()),
        GameStatus::Finished => match snapshot.winner() {
            Some(winner) => format!("Game over. Player {winner} wins"),
            None => "Game over".to_string(),
        },
    }
}

/// Draws the 5×5 grid. The valley is shown as `*` when empty and the
/// selected cell is bracketed.
pub fn render_board(board: &Board, selected: Option<Cell>) -> String {
    let mut out = String::from("     0    1    2    3    4\n");
    for row in 0..BOARD_SIZE {
        let _ = write!(out, "{row} ");
        for col in 0..BOARD_SIZE {
            let Some(cell) = Cell::new(row, col) else {
                continue;
            };
            let glyph = match board.get(cell) {
                Some(piece) => format!("{}{}", piece.kind, piece.player),
                None if cell.is_center() => " *".to_string(),
                None => " .".to_string(),
            };
            if selected == Some(cell) {
                let _ = write!(out, " [{glyph}]");
            } else {
                let _ = write!(out, "  {glyph} ");
            }
        }
        out.push('\n');
    }
    out
}
