//! Random Move Chess Engine
//!
//! Selects moves uniformly at random. It is the final step of every AI move
//! decision: whatever the providers do, a side that has a move gets one.

use chess_core::{Move, Position, legal_moves, pseudo_legal_moves};
use rand::seq::SliceRandom;
use rand::{Rng, thread_rng};


/// Picks uniformly among legal moves.
///
/// In relaxed mode a position with no legal moves (the king may already be
/// gone) falls back to pseudo-legal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomEngine {
    relaxed: bool,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self { relaxed: false }
    }

    pub fn relaxed() -> Self {
        Self { relaxed: true }
    }

    /// Candidate moves this engine draws from.
    pub fn candidates(&self, pos: &Position) -> Vec<Move> {
        let moves = legal_moves(pos);
        if moves.is_empty() && self.relaxed {
            return pseudo_legal_moves(pos);
        }
        moves
    }

    pub fn choose_with<R: Rng + ?Sized>(&self, pos: &Position, rng: &mut R) -> Option<Move> {
        self.candidates(pos).choose(rng).copied()
    }

    pub fn choose(&self, pos: &Position) -> Option<Move> {
        self.choose_with(pos, &mut thread_rng())
    }
}
