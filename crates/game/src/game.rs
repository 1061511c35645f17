use chess_core::{Color, Move, Position, RepetitionKey, classify, move_to_san};
use chrono::Utc;
use llm_engine::{Decision, DecisionRequest, MovePipeline};
use tracing::{debug, info};

use crate::error::{GameError, StoreError};
use crate::model::*;

/// Result of one applied move.
#[derive(Clone, Debug)]
pub struct MoveOutcome {
    pub entry: MoveLogEntry,
    pub status: GameStatus,
}

#[derive(Clone, Debug)]
pub struct AiMove {
    pub outcome: MoveOutcome,
    pub decision: Decision,
}

/// One game: header, move log and the position the log leads to.
///
/// Every operation checks the game state before touching anything, so a
/// rejected request leaves the game exactly as it was.
#[derive(Clone, Debug)]
pub struct Game {
    record: GameRecord,
    moves: Vec<MoveLogEntry>,
    position: Position,
    history: Vec<RepetitionKey>,
}

impl Game {
    pub fn new(record: GameRecord) -> Self {
        let position = Position::startpos();
        let history = vec![position.repetition_key()];
        Self {
            record,
            moves: Vec::new(),
            position,
            history,
        }
    }

    /// Rebuilds a game from its stored header and move log.
    pub fn restore(record: GameRecord, moves: Vec<MoveLogEntry>) -> Result<Self, StoreError> {
        let mut game = Game::new(record);
        for (i, entry) in moves.iter().enumerate() {
            if entry.ply as usize != i + 1 {
                return Err(StoreError::Corrupt(format!(
                    "game {}: expected ply {}, found {}",
                    game.record.id,
                    i + 1,
                    entry.ply
                )));
            }
            let pos = Position::from_fen(&entry.fen).map_err(|e| {
                StoreError::Corrupt(format!("game {} ply {}: {e}", game.record.id, entry.ply))
            })?;
            game.history.push(pos.repetition_key());
            game.position = pos;
        }
        game.moves = moves;
        Ok(game)
    }

    pub fn id(&self) -> GameId {
        self.record.id
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn status(&self) -> GameStatus {
        self.record.status
    }

    pub fn is_finished(&self) -> bool {
        self.record.status.is_finished()
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn moves(&self) -> &[MoveLogEntry] {
        &self.moves
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn controller(&self, side: Color) -> &Controller {
        &self.record.participant(side).controller
    }

    pub fn san_history(&self) -> Vec<String> {
        self.moves.iter().map(|m| m.san.clone()).collect()
    }

    /// Applies `mv` for `side`.
    ///
    /// Checks run in order: finished game, turn, then the move itself. With
    /// rules relaxed any move from an occupied square is accepted and the
    /// position is not classified afterwards.
    pub fn submit_move(
        &mut self,
        side: Color,
        mv: Move,
        enforce_rules: bool,
    ) -> Result<MoveOutcome, GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        let expected = self.position.side_to_move;
        if side != expected {
            return Err(GameError::WrongTurn {
                expected,
                got: side,
            });
        }

        let played = self.position.find_legal(mv).unwrap_or(mv);
        let next = if enforce_rules {
            self.position.apply_move(played)?
        } else {
            self.position.apply_relaxed(played)?
        };
        let san = move_to_san(&self.position, played);

        let entry = MoveLogEntry {
            ply: self.moves.len() as u32 + 1,
            side,
            uci: played.to_string(),
            san,
            fen: next.to_fen(),
            timestamp: Utc::now(),
        };
        debug!(game = self.record.id, ply = entry.ply, mv = %entry.uci, "move applied");

        self.history.push(next.repetition_key());
        self.position = next;
        self.moves.push(entry.clone());

        if enforce_rules {
            let status = GameStatus::from_position(classify(&self.position, &self.history));
            if status.is_finished() {
                info!(game = self.record.id, ?status, "game over");
                self.record.status = status;
            }
        }

        Ok(MoveOutcome {
            entry,
            status: self.record.status,
        })
    }

    /// Asks `engine_id` for a move for the side to move and plays it.
    pub async fn request_ai_move(
        &mut self,
        pipeline: &MovePipeline,
        engine_id: &str,
        enforce_rules: bool,
    ) -> Result<AiMove, GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        let san_history = self.san_history();
        let decision = pipeline
            .decide(DecisionRequest {
                position: &self.position,
                san_history: &san_history,
                engine_id,
                enforce_rules,
            })
            .await?;
        let side = self.position.side_to_move;
        let outcome = self.submit_move(side, decision.mv, enforce_rules)?;
        Ok(AiMove { outcome, decision })
    }

    pub fn resign(&mut self, side: Color) -> Result<GameStatus, GameError> {
        self.finish(GameResult::win_for(side.other()), Termination::Resignation)
    }

    /// Ends the game without a result.
    pub fn stop(&mut self) -> Result<GameStatus, GameError> {
        self.finish(GameResult::Undetermined, Termination::ManualStop)
    }

    fn finish(
        &mut self,
        result: GameResult,
        termination: Termination,
    ) -> Result<GameStatus, GameError> {
        if self.is_finished() {
            return Err(GameError::GameFinished);
        }
        self.record.status = GameStatus::Finished {
            result,
            termination,
        };
        info!(game = self.record.id, ?result, ?termination, "game ended");
        Ok(self.record.status)
    }
}

#[cfg(test)]
#[path = "game_tests.rs"]
mod game_tests;
