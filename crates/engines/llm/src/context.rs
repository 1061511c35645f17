use std::fmt;

use chess_core::{Color, PieceKind, Position, legal_moves, sq_to_coord};
use serde::Serialize;

/// Coarse stage of the game, used to steer the prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Opening,
    Middlegame,
    Endgame,
}

/// At or below this many non-pawn, non-king pieces the game is an endgame
/// regardless of move count.
const ENDGAME_MATERIAL: usize = 6;
const OPENING_PLIES: usize = 10;
const MIDDLEGAME_PLIES: usize = 40;

impl GamePhase {
    pub fn classify(pos: &Position, plies: usize) -> GamePhase {
        if pos.non_pawn_material_count() <= ENDGAME_MATERIAL {
            GamePhase::Endgame
        } else if plies <= OPENING_PLIES {
            GamePhase::Opening
        } else if plies <= MIDDLEGAME_PLIES {
            GamePhase::Middlegame
        } else {
            GamePhase::Endgame
        }
    }
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GamePhase::Opening => "opening",
            GamePhase::Middlegame => "middlegame",
            GamePhase::Endgame => "endgame",
        })
    }
}

/// Everything a provider is told about the position. Built fresh for every
/// request and discarded afterwards.
#[derive(Clone, Debug)]
pub struct AiContext {
    pub fen: String,
    pub side_to_move: Color,
    pub phase: GamePhase,
    pub ply_count: usize,
    pub history: String,
    pub legal_moves: Vec<String>,
    /// The mover's own pieces standing on attacked squares, e.g. `knight on f3`.
    pub threatened: Vec<String>,
    pub in_check: bool,
    /// Suggestions already turned down while serving this request.
    pub rejected: Vec<String>,
}

impl AiContext {
    pub fn build(pos: &Position, san_history: &[String]) -> Self {
        let us = pos.side_to_move;
        let threatened = pos
            .pieces()
            .filter(|(s, pc)| {
                pc.color == us && pc.kind != PieceKind::King && pos.is_square_attacked(*s, us.other())
            })
            .map(|(s, pc)| format!("{} on {}", piece_name(pc.kind), sq_to_coord(s)))
            .collect();

        AiContext {
            fen: pos.to_fen(),
            side_to_move: us,
            phase: GamePhase::classify(pos, san_history.len()),
            ply_count: san_history.len(),
            history: format_history(san_history),
            legal_moves: legal_moves(pos).iter().map(|m| m.to_string()).collect(),
            threatened,
            in_check: pos.in_check(us),
            rejected: Vec::new(),
        }
    }

    pub fn reject(&mut self, suggestion: impl Into<String>) {
        let suggestion = suggestion.into();
        if !self.rejected.contains(&suggestion) {
            self.rejected.push(suggestion);
        }
    }
}

/// Numbered move pairs, `1. e4 e5 2. Nf3`.
pub fn format_history(san_history: &[String]) -> String {
    if san_history.is_empty() {
        return "Starting position".to_string();
    }
    san_history
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| format!("{}. {}", i + 1, pair.join(" ")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn piece_name(kind: PieceKind) -> &'static str {
    match kind {
        PieceKind::Pawn => "pawn",
        PieceKind::Knight => "knight",
        PieceKind::Bishop => "bishop",
        PieceKind::Rook => "rook",
        PieceKind::Queen => "queen",
        PieceKind::King => "king",
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
