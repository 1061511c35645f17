use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use game::{Game, GameError, StoreError};
use llm_engine::PipelineError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::view::GameView;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// The move was refused. Carries the position it was refused in.
    #[error("{message}")]
    IllegalMove {
        message: String,
        game: Box<GameView>,
    },
    /// Wrong turn or finished game. Carries the unchanged position.
    #[error("{message}")]
    Conflict {
        message: String,
        game: Option<Box<GameView>>,
    },
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    game: Option<&'a GameView>,
}

impl ApiError {
    /// Maps a rejected game operation, attaching the game as it stands.
    pub fn rejected(err: GameError, game: &Game) -> Self {
        let message = err.to_string();
        match err {
            GameError::IllegalMove(_) => ApiError::IllegalMove {
                message,
                game: Box::new(GameView::of(game)),
            },
            GameError::WrongTurn { .. } | GameError::GameFinished => ApiError::Conflict {
                message,
                game: Some(Box::new(GameView::of(game))),
            },
            GameError::Pipeline(e) => e.into(),
            GameError::Persistence(e) => e.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IllegalMove { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
            StoreError::Corrupt(_) | StoreError::Backend(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::UnknownEngine(_) => ApiError::BadRequest(err.to_string()),
            PipelineError::NoLegalMoves(_) => ApiError::Conflict {
                message: err.to_string(),
                game: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        let message = self.to_string();
        let game = match &self {
            ApiError::IllegalMove { game, .. } => Some(game.as_ref()),
            ApiError::Conflict { game, .. } => game.as_deref(),
            _ => None,
        };
        let body = Json(ErrorBody {
            error: &message,
            game,
        });
        (status, body).into_response()
    }
}
