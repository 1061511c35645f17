use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chess_core::Color;
use game::{GameId, GameSummary};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::ApiError;
use crate::service::{AiMoveRequest, ArenaService, MoveRequest, NewGameRequest};
use crate::view::{AiMoveResponse, GameView, MoveLogResponse, MoveResponse, VersionInfo};

type Shared = State<Arc<ArenaService>>;

pub fn router(service: Arc<ArenaService>) -> Router {
    Router::new()
        .route("/api/new-game", post(new_game))
        .route("/api/move", post(submit_move))
        .route("/api/ai-move", post(ai_move))
        .route("/api/games", get(list_games))
        .route("/api/game/{id}", get(get_game))
        .route("/api/game/{id}/moves", get(move_log))
        .route("/api/game/{id}/resign", post(resign))
        .route("/api/game/{id}/stop", post(stop))
        .route("/api/version", get(version))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn new_game(
    State(service): Shared,
    Json(req): Json<NewGameRequest>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let view = service.new_game(req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn submit_move(
    State(service): Shared,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    Ok(Json(service.submit_move(req).await?))
}

async fn ai_move(
    State(service): Shared,
    Json(req): Json<AiMoveRequest>,
) -> Result<Json<AiMoveResponse>, ApiError> {
    Ok(Json(service.ai_move(req).await?))
}

async fn get_game(
    State(service): Shared,
    Path(id): Path<GameId>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(service.get_game(id).await?))
}

#[derive(Serialize)]
struct GameList {
    games: Vec<GameSummary>,
}

async fn list_games(State(service): Shared) -> Result<Json<GameList>, ApiError> {
    let games = service.list_games().await?;
    Ok(Json(GameList { games }))
}

async fn move_log(
    State(service): Shared,
    Path(id): Path<GameId>,
) -> Result<Json<MoveLogResponse>, ApiError> {
    Ok(Json(service.move_log(id).await?))
}

#[derive(Deserialize)]
struct ResignQuery {
    side: Option<Color>,
}

async fn resign(
    State(service): Shared,
    Path(id): Path<GameId>,
    Query(q): Query<ResignQuery>,
) -> Result<Json<GameView>, ApiError> {
    Ok(Json(service.resign(id, q.side).await?))
}

async fn stop(State(service): Shared, Path(id): Path<GameId>) -> Result<Json<GameView>, ApiError> {
    Ok(Json(service.stop(id).await?))
}

async fn version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}
