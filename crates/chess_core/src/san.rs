//! Standard Algebraic Notation for move logs and prompts.

use crate::{board::Position, movegen::legal_moves, types::*};

/// Formats `mv` in SAN relative to `pos`, the position before the move.
///
/// Moves that are not legal in `pos` (rules-relaxed play) are written in
/// coordinate notation instead.
pub fn move_to_san(pos: &Position, mv: Move) -> String {
    let legal = legal_moves(pos);
    let Some(mv) = legal.iter().copied().find(|m| m.same_squares(&mv)) else {
        return mv.to_string();
    };
    let Some(piece) = pos.piece_at(mv.from) else {
        return mv.to_string();
    };

    let mut san = String::new();
    if mv.is_castle {
        san.push_str(if mv.to > mv.from { "O-O" } else { "O-O-O" });
    } else {
        if piece.kind != PieceKind::Pawn {
            san.push(piece.kind.letter().to_ascii_uppercase());
            san.push_str(&disambiguation(&legal, mv, pos, piece.kind));
        }
        if mv.is_capture {
            if piece.kind == PieceKind::Pawn {
                san.push((b'a' + (mv.from % 8)) as char);
            }
            san.push('x');
        }
        san.push_str(&sq_to_coord(mv.to));
        if let Some(promo) = mv.promo {
            san.push('=');
            san.push(promo.letter().to_ascii_uppercase());
        }
    }

    let mut after = pos.clone();
    after.make_move(mv);
    if after.in_check(after.side_to_move) {
        san.push(if legal_moves(&after).is_empty() { '#' } else { '+' });
    }
    san
}

/// File, rank, or both, needed to tell `mv` apart from same-kind rivals.
fn disambiguation(legal: &[Move], mv: Move, pos: &Position, kind: PieceKind) -> String {
    let rivals: Vec<u8> = legal
        .iter()
        .filter(|m| m.to == mv.to && m.from != mv.from)
        .filter(|m| pos.piece_at(m.from).is_some_and(|p| p.kind == kind))
        .map(|m| m.from)
        .collect();
    if rivals.is_empty() {
        return String::new();
    }

    let coord = sq_to_coord(mv.from);
    let shares_file = rivals.iter().any(|&s| file_of(s) == file_of(mv.from));
    let shares_rank = rivals.iter().any(|&s| rank_of(s) == rank_of(mv.from));
    match (shares_file, shares_rank) {
        (false, _) => coord[..1].to_string(),
        (true, false) => coord[1..].to_string(),
        (true, true) => coord,
    }
}

#[cfg(test)]
#[path = "san_tests.rs"]
mod san_tests;
