//! Tests for decoding board payloads recorded from the game service.

use kings_valley::{Board, Cell, Piece, PieceKind, PlayerNumber};

const OPENING: &str = r#"[
    [{"player": 2, "type": "P"}, {"player": 2, "type": "P"}, {"player": 2, "type": "K"}, {"player": 2, "type": "P"}, {"player": 2, "type": "P"}],
    [null, null, null, null, null],
    [null, null, null, null, null],
    [null, null, null, null, null],
    [{"player": 1, "type": "P"}, {"player": 1, "type": "P"}, {"player": 1, "type": "K"}, {"player": 1, "type": "P"}, {"player": 1, "type": "P"}]
]"#;

#[test]
fn test_opening_payload_matches_opening_layout() {
    let board: Board = serde_json::from_str(OPENING).expect("Valid board payload");
    assert_eq!(board, Board::opening());
}

#[test]
fn test_board_round_trips_through_wire_form() {
    let board = Board::opening()
        .with(Cell::new(4, 0).unwrap(), None)
        .with(
            Cell::new(1, 0).unwrap(),
            Some(Piece::new(PieceKind::Pawn, PlayerNumber::One)),
        );
    let json = serde_json::to_value(&board).expect("Serializable");
    assert!(json[4][0].is_null());
    assert_eq!(json[1][0]["type"], "P");
    assert_eq!(json[1][0]["player"], 1);

    let back: Board = serde_json::from_value(json).expect("Decodable");
    assert_eq!(back, board);
}

#[test]
fn test_unknown_piece_marker_is_rejected() {
    let payload = OPENING.replacen("\"K\"", "\"Q\"", 1);
    assert!(serde_json::from_str::<Board>(&payload).is_err());
}

#[test]
fn test_king_in_valley() {
    let board = Board::opening()
        .with(Cell::new(0, 2).unwrap(), None)
        .with(
            Cell::CENTER,
            Some(Piece::new(PieceKind::King, PlayerNumber::Two)),
        );
    assert_eq!(board.king_of(PlayerNumber::Two), Some(Cell::CENTER));
    assert!(board.is_owned_by(Cell::CENTER, PlayerNumber::Two));
}
