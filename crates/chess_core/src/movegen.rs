use crate::board::{DIAGONALS, KING_DELTAS, KNIGHT_DELTAS, ORTHOGONALS, Position};
use crate::types::*;

/// Generate all legal moves, returning a freshly allocated vector.
/// Internally delegates to `legal_moves_into`, cloning the position only once.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut tmp = pos.clone();
    let mut out = Vec::with_capacity(64);
    legal_moves_into(&mut tmp, &mut out);
    out
}

/// Generate all legal moves into the provided buffer, reusing it across calls.
pub fn legal_moves_into(pos: &mut Position, out: &mut Vec<Move>) {
    out.clear();
    pseudo_moves(pos, out);

    let mover = pos.side_to_move;
    out.retain(|&mv| {
        let undo = pos.make_move(mv);
        let illegal = pos.in_check(mover);
        pos.unmake_move(mv, undo);
        !illegal
    });
}

/// Moves that obey piece movement but may leave the mover's king attacked.
pub fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut out = Vec::with_capacity(64);
    pseudo_moves(pos, &mut out);
    out
}

fn pseudo_moves(pos: &Position, out: &mut Vec<Move>) {
    let us = pos.side_to_move;
    for (from, pc) in pos.pieces() {
        if pc.color != us {
            continue;
        }
        match pc.kind {
            PieceKind::Pawn => gen_pawn(pos, from, us, out),
            PieceKind::Knight => gen_steps(pos, from, us, &KNIGHT_DELTAS, out),
            PieceKind::Bishop => gen_slider(pos, from, us, &DIAGONALS, out),
            PieceKind::Rook => gen_slider(pos, from, us, &ORTHOGONALS, out),
            PieceKind::Queen => {
                gen_slider(pos, from, us, &DIAGONALS, out);
                gen_slider(pos, from, us, &ORTHOGONALS, out);
            }
            PieceKind::King => {
                gen_steps(pos, from, us, &KING_DELTAS, out);
                gen_castle(pos, from, us, out);
            }
        }
    }
}

fn push_pawn_move(mv: Move, promo_rank: i8, out: &mut Vec<Move>) {
    if rank_of(mv.to) == promo_rank {
        out.extend(PieceKind::PROMOTIONS.iter().map(|&pk| mv.with_promo(pk)));
    } else {
        out.push(mv);
    }
}

fn gen_pawn(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let (f, r) = (file_of(from), rank_of(from));
    let dir = c.forward();
    let start_rank = c.back_rank() + dir;
    let promo_rank = c.other().back_rank();

    if let Some(to) = sq(f, r + dir).filter(|&s| pos.piece_at(s).is_none()) {
        push_pawn_move(Move::new(from, to), promo_rank, out);

        if r == start_rank {
            if let Some(to2) = sq(f, r + 2 * dir).filter(|&s| pos.piece_at(s).is_none()) {
                out.push(Move::new(from, to2));
            }
        }
    }

    for df in [-1, 1] {
        let Some(to) = sq(f + df, r + dir) else {
            continue;
        };
        match pos.piece_at(to) {
            Some(target) if target.color != c => {
                let mut mv = Move::new(from, to);
                mv.is_capture = true;
                push_pawn_move(mv, promo_rank, out);
            }
            None if pos.en_passant == Some(to) => {
                let mut mv = Move::new(from, to);
                mv.is_capture = true;
                mv.is_en_passant = true;
                out.push(mv);
            }
            _ => {}
        }
    }
}

/// Single-step movers: knight and king.
fn gen_steps(pos: &Position, from: u8, c: Color, deltas: &[(i8, i8)], out: &mut Vec<Move>) {
    let (f, r) = (file_of(from), rank_of(from));
    for &(df, dr) in deltas {
        let Some(to) = sq(f + df, r + dr) else {
            continue;
        };
        match pos.piece_at(to) {
            None => out.push(Move::new(from, to)),
            Some(pc) if pc.color != c => {
                let mut mv = Move::new(from, to);
                mv.is_capture = true;
                out.push(mv);
            }
            _ => {}
        }
    }
}

fn gen_slider(pos: &Position, from: u8, c: Color, dirs: &[(i8, i8)], out: &mut Vec<Move>) {
    let (f0, r0) = (file_of(from), rank_of(from));
    for &(df, dr) in dirs {
        let (mut f, mut r) = (f0 + df, r0 + dr);
        while let Some(to) = sq(f, r) {
            match pos.piece_at(to) {
                None => out.push(Move::new(from, to)),
                Some(pc) => {
                    if pc.color != c {
                        let mut mv = Move::new(from, to);
                        mv.is_capture = true;
                        out.push(mv);
                    }
                    break;
                }
            }
            f += df;
            r += dr;
        }
    }
}

struct CastleSide {
    allowed: bool,
    rook_from: u8,
    king_to: u8,
    /// Squares that must be empty.
    between: &'static [u8],
    /// Squares the king crosses or lands on.
    path: [u8; 2],
}

fn gen_castle(pos: &Position, from: u8, c: Color, out: &mut Vec<Move>) {
    let rights = pos.castling;
    let (king_from, sides) = match c {
        Color::White => (
            4u8,
            [
                CastleSide {
                    allowed: rights.wk,
                    rook_from: 7,
                    king_to: 6,
                    between: &[5, 6],
                    path: [5, 6],
                },
                CastleSide {
                    allowed: rights.wq,
                    rook_from: 0,
                    king_to: 2,
                    between: &[3, 2, 1],
                    path: [3, 2],
                },
            ],
        ),
        Color::Black => (
            60u8,
            [
                CastleSide {
                    allowed: rights.bk,
                    rook_from: 63,
                    king_to: 62,
                    between: &[61, 62],
                    path: [61, 62],
                },
                CastleSide {
                    allowed: rights.bq,
                    rook_from: 56,
                    king_to: 58,
                    between: &[59, 58, 57],
                    path: [59, 58],
                },
            ],
        ),
    };
    if from != king_from || pos.in_check(c) {
        return;
    }

    let enemy = c.other();
    let rook = Some(Piece::new(c, PieceKind::Rook));
    for side in sides {
        let ready = side.allowed
            && pos.piece_at(side.rook_from) == rook
            && side.between.iter().all(|&s| pos.piece_at(s).is_none())
            && side.path.iter().all(|&s| !pos.is_square_attacked(s, enemy));
        if ready {
            let mut mv = Move::new(king_from, side.king_to);
            mv.is_castle = true;
            out.push(mv);
        }
    }
}

#[cfg(test)]
#[path = "movegen_tests.rs"]
mod movegen_tests;
