//! Game-end classification: mate, stalemate and the draw rules.

use chess_core::{
    Color, Move, Position, PositionStatus, RepetitionKey, classify, coord_to_sq, legal_moves,
};

fn fen(s: &str) -> Position {
    Position::from_fen(s).unwrap()
}

fn play(pos: &Position, from: &str, to: &str) -> Position {
    let mv = Move::new(coord_to_sq(from).unwrap(), coord_to_sq(to).unwrap());
    pos.apply_move(mv).unwrap()
}

// =============================================================================
// Mate and stalemate
// =============================================================================

#[test]
fn fools_mate_is_checkmate_for_black() {
    let mut pos = Position::startpos();
    let mut history = vec![pos.repetition_key()];
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
        pos = play(&pos, from, to);
        history.push(pos.repetition_key());
    }
    assert_eq!(
        classify(&pos, &history),
        PositionStatus::Checkmate {
            winner: Color::Black
        }
    );
}

#[test]
fn stalemate_king_in_corner() {
    let pos = fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
    assert!(legal_moves(&pos).is_empty());
    assert!(!pos.in_check(Color::Black));
    assert_eq!(classify(&pos, &[]), PositionStatus::Stalemate);
}

#[test]
fn stalemate_king_and_pawn_endgame() {
    let pos = fen("6k1/6P1/6K1/8/8/8/8/8 b - - 0 1");
    assert_eq!(classify(&pos, &[]), PositionStatus::Stalemate);
}

#[test]
fn check_is_not_checkmate() {
    let pos = fen("rnbqkbnr/ppppp1pp/8/5p1Q/4P3/8/PPPP1PPP/RNB1KBNR b KQkq - 1 2");
    assert!(pos.in_check(Color::Black));
    assert_eq!(classify(&pos, &[]), PositionStatus::Ongoing);
}

#[test]
fn mate_outranks_fifty_move_rule() {
    // Back-rank mate delivered on the hundredth quiet half-move.
    let pos = fen("R5k1/5ppp/8/8/8/8/8/6K1 b - - 100 80");
    assert_eq!(
        classify(&pos, &[]),
        PositionStatus::Checkmate {
            winner: Color::White
        }
    );
}

// =============================================================================
// Fifty-move rule
// =============================================================================

#[test]
fn fifty_move_rule_at_100_halfmoves() {
    let pos = fen("8/8/8/4k3/8/4K3/4P3/8 w - - 100 60");
    assert!(pos.is_fifty_move_draw());
    assert_eq!(classify(&pos, &[]), PositionStatus::FiftyMoveRule);
}

#[test]
fn fifty_move_rule_at_99_halfmoves() {
    let pos = fen("8/8/8/4k3/8/4K3/4P3/8 w - - 99 60");
    assert!(!pos.is_fifty_move_draw());
    assert_eq!(classify(&pos, &[]), PositionStatus::Ongoing);
}

#[test]
fn fifty_move_clock_resets_on_pawn_move() {
    let pos = fen("8/8/8/4k3/8/3K4/4P3/8 w - - 99 60");
    let next = play(&pos, "e2", "e3");
    assert_eq!(next.halfmove_clock, 0);
    assert!(!next.is_fifty_move_draw());
}

// =============================================================================
// Insufficient material
// =============================================================================

#[test]
fn insufficient_material_cases() {
    let drawn = [
        ("8/8/8/4k3/8/4K3/8/8 w - - 0 1", "K v K"),
        ("8/8/8/4k3/8/4KB2/8/8 w - - 0 1", "K+B v K"),
        ("8/8/8/4k3/8/4KN2/8/8 w - - 0 1", "K+N v K"),
        ("8/8/4b3/4k3/8/4K3/8/8 w - - 0 1", "K v K+B"),
        ("8/8/4n3/4k3/8/4K3/8/8 w - - 0 1", "K v K+N"),
        ("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1", "same-colored bishops"),
    ];
    for (text, label) in drawn {
        let pos = fen(text);
        assert!(pos.is_insufficient_material(), "{label}");
        assert_eq!(
            classify(&pos, &[]),
            PositionStatus::InsufficientMaterial,
            "{label}"
        );
    }
}

#[test]
fn sufficient_material_cases() {
    let live = [
        ("2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1", "opposite-colored bishops"),
        ("8/8/8/4k3/8/4K3/4P3/8 w - - 0 1", "pawn"),
        ("8/8/8/4k3/8/4K3/8/4R3 w - - 0 1", "rook"),
        ("8/8/8/4k3/8/4K3/8/4Q3 w - - 0 1", "queen"),
        ("8/8/8/4k3/8/4K3/3NN3/8 w - - 0 1", "two knights"),
    ];
    for (text, label) in live {
        assert!(!fen(text).is_insufficient_material(), "{label}");
    }
}

// =============================================================================
// Repetition
// =============================================================================

#[test]
fn knight_shuffle_reaches_threefold_repetition() {
    let mut pos = Position::startpos();
    let mut history: Vec<RepetitionKey> = vec![pos.repetition_key()];
    let shuffle = [("g1", "f3"), ("g8", "f6"), ("f3", "g1"), ("f6", "g8")];

    for round in 0..2 {
        for (from, to) in shuffle {
            pos = play(&pos, from, to);
            history.push(pos.repetition_key());
            let status = classify(&pos, &history);
            let last_of_second_round = round == 1 && from == "f6";
            if last_of_second_round {
                assert_eq!(status, PositionStatus::ThreefoldRepetition);
            } else {
                assert_eq!(status, PositionStatus::Ongoing);
            }
        }
    }
}

#[test]
fn en_passant_square_without_a_capture_is_ignored() {
    let with_ep = fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    let without = fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
    assert_eq!(with_ep.repetition_key(), without.repetition_key());
}

#[test]
fn capturable_en_passant_square_distinguishes_positions() {
    let with_ep = fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3");
    let without = fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3");
    assert_ne!(with_ep.repetition_key(), without.repetition_key());
}

#[test]
fn position_after_double_push_counts_toward_repetition() {
    let mut pos = play(&Position::startpos(), "e2", "e4");
    let mut history = vec![Position::startpos().repetition_key(), pos.repetition_key()];
    let shuffle = [("g8", "f6"), ("g1", "f3"), ("f6", "g8"), ("f3", "g1")];

    for round in 0..2 {
        for (from, to) in shuffle {
            pos = play(&pos, from, to);
            history.push(pos.repetition_key());
        }
        let expected = if round == 1 {
            PositionStatus::ThreefoldRepetition
        } else {
            PositionStatus::Ongoing
        };
        assert_eq!(classify(&pos, &history), expected);
    }
}
