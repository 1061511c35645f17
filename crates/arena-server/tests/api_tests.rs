//! HTTP routes driven through `Router::oneshot`.

use std::sync::Arc;

use arena_server::{ArenaConfig, ArenaService, SqliteStore, router};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use game::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(store: Arc<dyn game::GameStore>) -> Router {
    // No API keys: every hosted entry is skipped and moves come from the
    // random fallback.
    let config = ArenaConfig::default();
    let service = ArenaService::new(
        store,
        Arc::new(config.build_pipeline()),
        config.default_engine.clone(),
    );
    router(Arc::new(service))
}

fn app() -> Router {
    app_with(Arc::new(MemoryStore::new()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header("content-type", "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create(app: &Router, body: Value) -> i64 {
    let (status, game) = call(app, "POST", "/api/new-game", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{game}");
    game["game_id"].as_i64().unwrap()
}

#[tokio::test]
async fn new_game_starts_from_the_initial_position() {
    let app = app();
    let (status, game) = call(
        &app,
        "POST",
        "/api/new-game",
        Some(json!({ "mode": "human-vs-ai", "color": "white", "ai_engine": "openai" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        game["fen"],
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
    assert_eq!(game["moves"], json!([]));
    assert_eq!(game["status"]["state"], "in_progress");
    assert_eq!(game["white"]["controller"]["type"], "human");
    assert_eq!(game["black"]["controller"]["engine"], "openai");
    assert_eq!(game["enforce_rules"], true);
}

#[tokio::test]
async fn human_move_is_answered_by_the_ai() {
    let app = app();
    let id = create(&app, json!({ "mode": "human-vs-ai", "ai_engine": "openai" })).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/move",
        Some(json!({ "game_id": id, "move": "e2e4" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["moves"][0], "e2e4");
    assert_eq!(body["moves"].as_array().unwrap().len(), 2);
    assert_eq!(body["ai_move"]["source"]["kind"], "random_fallback");
    assert_eq!(body["side_to_move"], "white");

    let (_, log) = call(&app, "GET", &format!("/api/game/{id}/moves"), None).await;
    assert_eq!(log["moves"][0]["san"], "e4");
    assert_eq!(log["pairs"][0]["move_number"], 1);
    assert_eq!(log["pairs"][0]["white"], "e4");
}

#[tokio::test]
async fn illegal_move_returns_422_with_position() {
    let app = app();
    let id = create(&app, json!({ "mode": "human-vs-human" })).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/move",
        Some(json!({ "game_id": id, "move": "e2e5" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("illegal"));
    assert_eq!(body["game"]["moves"], json!([]));
}

#[tokio::test]
async fn wrong_turn_returns_409_with_unchanged_position() {
    let app = app();
    let id = create(&app, json!({ "mode": "human-vs-ai", "color": "black" })).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/move",
        Some(json!({ "game_id": id, "move": "e2e4" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["game"]["fen"],
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
    );
}

#[tokio::test]
async fn ai_vs_ai_game_plays_and_stops() {
    let app = app();
    let id = create(&app, json!({ "mode": "ai-vs-ai", "ai_engine": "random" })).await;

    for ply in 1..=3 {
        let (status, body) = call(
            &app,
            "POST",
            "/api/ai-move",
            Some(json!({ "game_id": id })),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["moves"].as_array().unwrap().len(), ply);
        assert_eq!(body["move"]["engine"], "random");
    }

    let (status, body) = call(&app, "POST", &format!("/api/game/{id}/stop"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["termination"], "manual_stop");
    assert_eq!(body["status"]["result"], "undetermined");

    let (status, _) = call(
        &app,
        "POST",
        "/api/ai-move",
        Some(json!({ "game_id": id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn resign_through_query_side() {
    let app = app();
    let id = create(&app, json!({ "mode": "human-vs-human" })).await;
    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/game/{id}/resign?side=white"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"]["result"], "black_wins");
    assert_eq!(body["status"]["termination"], "resignation");
}

#[tokio::test]
async fn games_are_listed_newest_first() {
    let app = app();
    let first = create(&app, json!({ "mode": "human-vs-human" })).await;
    let second = create(&app, json!({ "mode": "ai-vs-ai" })).await;

    let (status, body) = call(&app, "GET", "/api/games", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<i64> = body["games"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, [second, first]);
}

#[tokio::test]
async fn errors_for_bad_input() {
    let app = app();

    let (status, _) = call(&app, "GET", "/api/game/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(
        &app,
        "POST",
        "/api/new-game",
        Some(json!({ "mode": "human-vs-ai", "ai_engine": "stockfish" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = create(&app, json!({ "mode": "human-vs-human" })).await;
    let (status, _) = call(
        &app,
        "POST",
        "/api/move",
        Some(json!({ "game_id": id, "move": "zz" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn version_reports_the_package() {
    let (status, body) = call(&app(), "GET", "/api/version", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "arena-server");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn relaxed_game_over_sqlite() {
    let store = SqliteStore::in_memory().await.unwrap();
    let app = app_with(Arc::new(store));
    let id = create(
        &app,
        json!({ "mode": "human-vs-human", "enforce_rules": false }),
    )
    .await;

    // Queen jumps over its own pawn and takes on d7.
    let (status, body) = call(
        &app,
        "POST",
        "/api/move",
        Some(json!({ "game_id": id, "move": "d1d7" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"]["state"], "in_progress");

    let (_, game) = call(&app, "GET", &format!("/api/game/{id}"), None).await;
    assert_eq!(game["moves"], json!(["d1d7"]));
    assert_eq!(game["enforce_rules"], false);
}
