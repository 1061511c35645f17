use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use chess_core::{Color, parse_coordinate_move};
use game::{
    Controller, Game, GameId, GameMode, GameStatus, GameStore, GameSummary, MoveOutcome, NewGame,
    Participant,
};
use llm_engine::MovePipeline;
use serde::Deserialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::view::{AiMoveResponse, AiMoveView, GameView, MoveLogResponse, MoveResponse};

pub const LIST_LIMIT: usize = 50;

fn default_color() -> Color {
    Color::White
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewGameRequest {
    pub mode: GameMode,
    /// Side the human plays in human-vs-ai games.
    #[serde(default = "default_color")]
    pub color: Color,
    pub enforce_rules: Option<bool>,
    pub ai_engine: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MoveRequest {
    pub game_id: GameId,
    #[serde(rename = "move")]
    pub mv: String,
    pub enforce_rules: Option<bool>,
    pub ai_engine: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AiMoveRequest {
    pub game_id: GameId,
    pub enforce_rules: Option<bool>,
    pub ai_engine: Option<String>,
}

/// Application layer between the HTTP routes and the game store.
///
/// Requests for the same game run one at a time. Each one reloads the game
/// from the store, and a move is only reported once it has been written.
pub struct ArenaService {
    store: Arc<dyn GameStore>,
    pipeline: Arc<MovePipeline>,
    default_engine: String,
    locks: Arc<LockTable>,
}

type LockTable = StdMutex<HashMap<GameId, Arc<Mutex<()>>>>;

/// Holds one game's request lock. The table entry goes away with the last
/// holder, so ids that were never loaded leave nothing behind.
struct GameGuard {
    table: Arc<LockTable>,
    id: GameId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for GameGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        if table
            .get(&self.id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.id);
        }
    }
}

impl ArenaService {
    pub fn new(
        store: Arc<dyn GameStore>,
        pipeline: Arc<MovePipeline>,
        default_engine: impl Into<String>,
    ) -> Self {
        Self {
            store,
            pipeline,
            default_engine: default_engine.into(),
            locks: Arc::default(),
        }
    }

    async fn lock(&self, id: GameId) -> GameGuard {
        let lock = {
            let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            table.entry(id).or_default().clone()
        };
        GameGuard {
            table: self.locks.clone(),
            id,
            guard: Some(lock.lock_owned().await),
        }
    }

    fn check_engine(&self, engine: &str) -> Result<(), ApiError> {
        if self.pipeline.knows_engine(engine) {
            Ok(())
        } else {
            Err(ApiError::BadRequest(format!("unknown AI engine `{engine}`")))
        }
    }

    /// Request override, then the side's own engine, then the game's, then
    /// the server default.
    fn engine_for(&self, game: &Game, requested: Option<&str>) -> String {
        requested
            .or_else(|| game.controller(game.side_to_move()).engine())
            .or(game.record().ai_engine.as_deref())
            .unwrap_or(self.default_engine.as_str())
            .to_string()
    }

    #[instrument(skip(self), fields(mode = ?req.mode))]
    pub async fn new_game(&self, req: NewGameRequest) -> Result<GameView, ApiError> {
        let engine = req
            .ai_engine
            .unwrap_or_else(|| self.default_engine.clone());
        self.check_engine(&engine)?;

        let ai = Controller::ai(engine.clone());
        let (white, black) = match req.mode {
            GameMode::HumanVsAi => {
                let human = ("Human".to_string(), Controller::Human);
                let bot = (format!("AI_{engine}"), ai);
                match req.color {
                    Color::White => (human, bot),
                    Color::Black => (bot, human),
                }
            }
            GameMode::AiVsAi => (
                (format!("AI1_{engine}"), ai.clone()),
                (format!("AI2_{engine}"), ai),
            ),
            GameMode::HumanVsHuman => (
                ("Human1".to_string(), Controller::Human),
                ("Human2".to_string(), Controller::Human),
            ),
        };

        let white = Participant::new(self.store.upsert_player(&white.0).await?, white.1);
        let black = Participant::new(self.store.upsert_player(&black.0).await?, black.1);
        let record = self
            .store
            .create_game(NewGame {
                white,
                black,
                mode: req.mode,
                ai_engine: Some(engine),
                enforce_rules: req.enforce_rules.unwrap_or(true),
            })
            .await?;
        info!(game = record.id, "new game");
        Ok(GameView::of(&Game::new(record)))
    }

    pub async fn get_game(&self, id: GameId) -> Result<GameView, ApiError> {
        let game = self.store.load_game(id).await?;
        Ok(GameView::of(&game))
    }

    pub async fn list_games(&self) -> Result<Vec<GameSummary>, ApiError> {
        Ok(self.store.list_games(LIST_LIMIT).await?)
    }

    pub async fn move_log(&self, id: GameId) -> Result<MoveLogResponse, ApiError> {
        let moves = self.store.move_log(id).await?;
        Ok(MoveLogResponse::new(id, moves))
    }

    /// Plays a human move and, when the opponent is an AI, its reply.
    #[instrument(skip(self), fields(game = req.game_id, mv = %req.mv))]
    pub async fn submit_move(&self, req: MoveRequest) -> Result<MoveResponse, ApiError> {
        let mv = parse_coordinate_move(&req.mv).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if let Some(engine) = req.ai_engine.as_deref() {
            self.check_engine(engine)?;
        }
        let _guard = self.lock(req.game_id).await;
        let mut game = self.store.load_game(req.game_id).await?;
        let enforce = req.enforce_rules.unwrap_or(game.record().enforce_rules);

        // Moves are submitted for the human side; an AI side to move is
        // somebody else's turn.
        let to_move = game.side_to_move();
        let side = if game.controller(to_move).is_human() {
            to_move
        } else {
            to_move.other()
        };
        let outcome = game
            .submit_move(side, mv, enforce)
            .map_err(|e| ApiError::rejected(e, &game))?;
        self.persist(&game, &outcome).await?;

        let ai_move = match self.reply_engine(&game, req.ai_engine.as_deref())? {
            Some(engine) => Some(self.play_ai(&mut game, &engine, enforce).await?),
            None => None,
        };
        Ok(MoveResponse {
            game: GameView::of(&game),
            ai_move,
        })
    }

    /// Engine that answers a human move, if the side now to move is an AI.
    fn reply_engine(&self, game: &Game, requested: Option<&str>) -> Result<Option<String>, ApiError> {
        if game.is_finished() || game.controller(game.side_to_move()).is_human() {
            return Ok(None);
        }
        let engine = self.engine_for(game, requested);
        self.check_engine(&engine)?;
        Ok(Some(engine))
    }

    #[instrument(skip(self), fields(game = req.game_id))]
    pub async fn ai_move(&self, req: AiMoveRequest) -> Result<AiMoveResponse, ApiError> {
        let _guard = self.lock(req.game_id).await;
        let mut game = self.store.load_game(req.game_id).await?;
        let enforce = req.enforce_rules.unwrap_or(game.record().enforce_rules);
        let engine = self.engine_for(&game, req.ai_engine.as_deref());
        self.check_engine(&engine)?;

        let mv = self.play_ai(&mut game, &engine, enforce).await?;
        Ok(AiMoveResponse {
            game: GameView::of(&game),
            mv,
        })
    }

    async fn play_ai(
        &self,
        game: &mut Game,
        engine: &str,
        enforce: bool,
    ) -> Result<AiMoveView, ApiError> {
        let ai = game
            .request_ai_move(&self.pipeline, engine, enforce)
            .await
            .map_err(|e| ApiError::rejected(e, game))?;
        self.persist(game, &ai.outcome).await?;
        Ok(AiMoveView::new(&ai.outcome.entry, engine, &ai.decision))
    }

    #[instrument(skip(self))]
    pub async fn resign(&self, id: GameId, side: Option<Color>) -> Result<GameView, ApiError> {
        let _guard = self.lock(id).await;
        let mut game = self.store.load_game(id).await?;
        let side = side.unwrap_or_else(|| game.side_to_move());
        let status = game.resign(side).map_err(|e| ApiError::rejected(e, &game))?;
        self.persist_status(id, status).await?;
        Ok(GameView::of(&game))
    }

    #[instrument(skip(self))]
    pub async fn stop(&self, id: GameId) -> Result<GameView, ApiError> {
        let _guard = self.lock(id).await;
        let mut game = self.store.load_game(id).await?;
        let status = game.stop().map_err(|e| ApiError::rejected(e, &game))?;
        self.persist_status(id, status).await?;
        Ok(GameView::of(&game))
    }

    async fn persist(&self, game: &Game, outcome: &MoveOutcome) -> Result<(), ApiError> {
        self.store
            .append_move(game.id(), &outcome.entry, outcome.status)
            .await?;
        if let GameStatus::Finished {
            result,
            termination,
        } = outcome.status
        {
            info!(game = game.id(), ?result, ?termination, "game finished");
        }
        Ok(())
    }

    async fn persist_status(&self, id: GameId, status: GameStatus) -> Result<(), ApiError> {
        if let GameStatus::Finished {
            result,
            termination,
        } = status
        {
            self.store.set_game_finished(id, result, termination).await?;
            info!(game = id, ?result, ?termination, "game finished");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod service_tests;
