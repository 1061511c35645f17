use super::*;
use crate::uci::parse_coordinate_move;

fn san(fen: &str, uci: &str) -> String {
    let pos = Position::from_fen(fen).unwrap();
    move_to_san(&pos, parse_coordinate_move(uci).unwrap())
}

#[test]
fn pawn_and_piece_moves() {
    let start = Position::startpos().to_fen();
    assert_eq!(san(&start, "e2e4"), "e4");
    assert_eq!(san(&start, "g1f3"), "Nf3");
}

#[test]
fn captures_and_promotion() {
    assert_eq!(
        san("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2", "e4d5"),
        "exd5"
    );
    assert_eq!(san("1n5k/P7/8/8/8/8/8/K7 w - - 0 1", "a7b8q"), "axb8=Q+");
}

#[test]
fn castling_is_written_with_letters() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    assert_eq!(san(fen, "e1g1"), "O-O");
    assert_eq!(san(fen, "e1c1"), "O-O-O");
}

#[test]
fn knights_on_same_rank_disambiguate_by_file() {
    assert_eq!(san("4k3/8/8/8/8/8/8/1N2KN2 w - - 0 1", "b1d2"), "Nbd2");
}

#[test]
fn rooks_on_same_file_disambiguate_by_rank() {
    assert_eq!(san("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1", "a1a3"), "R1a3");
}

#[test]
fn mate_gets_hash_suffix() {
    // Fool's mate, final move.
    let fen = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2";
    assert_eq!(san(fen, "d8h4"), "Qh4#");
}

#[test]
fn illegal_move_falls_back_to_coordinates() {
    let start = Position::startpos().to_fen();
    assert_eq!(san(&start, "e2e5"), "e2e5");
}
