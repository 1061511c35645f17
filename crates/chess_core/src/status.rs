use serde::{Deserialize, Serialize};

use crate::board::{Position, RepetitionKey};
use crate::movegen::legal_moves;
use crate::types::*;

/// What the rules say about a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

impl PositionStatus {
    pub fn is_terminal(self) -> bool {
        self != PositionStatus::Ongoing
    }
}

/// Classifies `pos` given the keys of every position reached so far,
/// the current one included.
///
/// Checkmate and stalemate win over the draw rules, which are then checked
/// in the order fifty-move, material, repetition.
pub fn classify(pos: &Position, history: &[RepetitionKey]) -> PositionStatus {
    if legal_moves(pos).is_empty() {
        let us = pos.side_to_move;
        return if pos.in_check(us) {
            PositionStatus::Checkmate { winner: us.other() }
        } else {
            PositionStatus::Stalemate
        };
    }
    if pos.is_fifty_move_draw() {
        return PositionStatus::FiftyMoveRule;
    }
    if pos.is_insufficient_material() {
        return PositionStatus::InsufficientMaterial;
    }
    let key = pos.repetition_key();
    if history.iter().filter(|&k| *k == key).count() >= 3 {
        return PositionStatus::ThreefoldRepetition;
    }
    PositionStatus::Ongoing
}

impl Position {
    pub fn is_fifty_move_draw(&self) -> bool {
        self.halfmove_clock >= 100
    }

    /// Neither side can ever deliver mate: bare kings, a single minor piece,
    /// or only bishops that all stand on one square color.
    pub fn is_insufficient_material(&self) -> bool {
        let mut knights = 0;
        let mut bishop_squares = Vec::new();
        for (s, pc) in self.pieces() {
            match pc.kind {
                PieceKind::King => {}
                PieceKind::Knight => knights += 1,
                PieceKind::Bishop => bishop_squares.push(is_light_square(s)),
                PieceKind::Pawn | PieceKind::Rook | PieceKind::Queen => return false,
            }
        }

        match (knights, bishop_squares.len()) {
            (0, 0) | (1, 0) | (0, 1) => true,
            (0, _) => bishop_squares.iter().all(|&light| light == bishop_squares[0]),
            _ => false,
        }
    }

    /// Pieces other than pawns and kings, both colors.
    pub fn non_pawn_material_count(&self) -> usize {
        self.pieces()
            .filter(|(_, pc)| !matches!(pc.kind, PieceKind::Pawn | PieceKind::King))
            .count()
    }
}
