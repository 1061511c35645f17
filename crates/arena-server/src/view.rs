//! JSON bodies returned by the API.

use chess_core::Color;
use game::{Game, GameId, GameMode, GameStatus, MoveLogEntry, Participant};
use llm_engine::{Decision, MoveSource};
use serde::{Deserialize, Serialize};

/// Snapshot of a game as clients see it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub game_id: GameId,
    pub fen: String,
    pub side_to_move: Color,
    pub in_check: bool,
    pub moves: Vec<String>,
    pub san: Vec<String>,
    pub status: GameStatus,
    pub mode: GameMode,
    pub white: Participant,
    pub black: Participant,
    pub enforce_rules: bool,
}

impl GameView {
    pub fn of(game: &Game) -> Self {
        let pos = game.position();
        let record = game.record();
        Self {
            game_id: game.id(),
            fen: pos.to_fen(),
            side_to_move: pos.side_to_move,
            in_check: pos.in_check(pos.side_to_move),
            moves: game.moves().iter().map(|m| m.uci.clone()).collect(),
            san: game.san_history(),
            status: game.status(),
            mode: record.mode,
            white: record.white.clone(),
            black: record.black.clone(),
            enforce_rules: record.enforce_rules,
        }
    }
}

/// A move chosen by the decision pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct AiMoveView {
    pub uci: String,
    pub san: String,
    pub engine: String,
    pub source: MoveSource,
    /// `provider/model: error` for every chain entry that did not deliver.
    pub failures: Vec<String>,
}

impl AiMoveView {
    pub fn new(entry: &MoveLogEntry, engine: &str, decision: &Decision) -> Self {
        Self {
            uci: entry.uci.clone(),
            san: entry.san.clone(),
            engine: engine.to_string(),
            source: decision.source.clone(),
            failures: decision
                .failures
                .iter()
                .map(|f| format!("{}/{}: {}", f.provider, f.model, f.error))
                .collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct MoveResponse {
    #[serde(flatten)]
    pub game: GameView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_move: Option<AiMoveView>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AiMoveResponse {
    #[serde(flatten)]
    pub game: GameView,
    #[serde(rename = "move")]
    pub mv: AiMoveView,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MovePair {
    pub move_number: u32,
    pub white: Option<String>,
    pub black: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct MoveLogResponse {
    pub game_id: GameId,
    pub moves: Vec<MoveLogEntry>,
    /// SAN grouped into numbered white/black pairs.
    pub pairs: Vec<MovePair>,
}

impl MoveLogResponse {
    pub fn new(game_id: GameId, moves: Vec<MoveLogEntry>) -> Self {
        let pairs = pair_moves(&moves);
        Self {
            game_id,
            moves,
            pairs,
        }
    }
}

/// Groups a log into full moves. A log that starts with black gets an
/// empty white slot.
pub fn pair_moves(moves: &[MoveLogEntry]) -> Vec<MovePair> {
    let mut pairs: Vec<MovePair> = Vec::new();
    for m in moves {
        let san = Some(m.san.clone());
        if m.side == Color::Black {
            if let Some(last) = pairs.last_mut().filter(|p| p.black.is_none()) {
                last.black = san;
                continue;
            }
        }
        let move_number = pairs.len() as u32 + 1;
        pairs.push(match m.side {
            Color::White => MovePair {
                move_number,
                white: san,
                black: None,
            },
            Color::Black => MovePair {
                move_number,
                white: None,
                black: san,
            },
        });
    }
    pairs
}

#[derive(Clone, Debug, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub build_date: Option<&'static str>,
}

impl VersionInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            build_date: option_env!("BUILD_DATE"),
        }
    }
}
