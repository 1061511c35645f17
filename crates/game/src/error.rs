use chess_core::{Color, MoveError};
use llm_engine::PipelineError;
use thiserror::Error;

use crate::model::GameId;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    NotFound(GameId),
    #[error("corrupt stored data: {0}")]
    Corrupt(String),
    #[error("storage backend failure: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    IllegalMove(#[from] MoveError),
    #[error("it is {expected}'s turn, not {got}'s")]
    WrongTurn { expected: Color, got: Color },
    #[error("game is already finished")]
    GameFinished,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}
