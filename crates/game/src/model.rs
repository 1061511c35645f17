use chess_core::{Color, PositionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type GameId = i64;
pub type PlayerId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
}

/// Who makes the moves for one side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Controller {
    Human,
    Ai { engine: String },
}

impl Controller {
    pub fn ai(engine: impl Into<String>) -> Self {
        Controller::Ai {
            engine: engine.into(),
        }
    }

    pub fn engine(&self) -> Option<&str> {
        match self {
            Controller::Human => None,
            Controller::Ai { engine } => Some(engine),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Controller::Human)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub player_id: PlayerId,
    pub name: String,
    pub controller: Controller,
}

impl Participant {
    pub fn new(player: Player, controller: Controller) -> Self {
        Self {
            player_id: player.id,
            name: player.name,
            controller,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameMode {
    HumanVsAi,
    AiVsAi,
    HumanVsHuman,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Undetermined,
}

impl GameResult {
    pub fn win_for(side: Color) -> Self {
        match side {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Checkmate,
    Stalemate,
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
    Resignation,
    ManualStop,
}

/// Explicit game lifecycle. A finished game never goes back to in-progress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Finished {
        result: GameResult,
        termination: Termination,
    },
}

impl GameStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, GameStatus::Finished { .. })
    }

    pub fn result(&self) -> GameResult {
        match self {
            GameStatus::InProgress => GameResult::Undetermined,
            GameStatus::Finished { result, .. } => *result,
        }
    }

    pub fn from_position(status: PositionStatus) -> Self {
        let finished = |result, termination| GameStatus::Finished {
            result,
            termination,
        };
        match status {
            PositionStatus::Ongoing => GameStatus::InProgress,
            PositionStatus::Checkmate { winner } => {
                finished(GameResult::win_for(winner), Termination::Checkmate)
            }
            PositionStatus::Stalemate => finished(GameResult::Draw, Termination::Stalemate),
            PositionStatus::FiftyMoveRule => finished(GameResult::Draw, Termination::FiftyMoveRule),
            PositionStatus::InsufficientMaterial => {
                finished(GameResult::Draw, Termination::InsufficientMaterial)
            }
            PositionStatus::ThreefoldRepetition => {
                finished(GameResult::Draw, Termination::ThreefoldRepetition)
            }
        }
    }
}

/// One applied move. Entries are appended, never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLogEntry {
    /// 1-based half-move number.
    pub ply: u32,
    pub side: Color,
    pub uci: String,
    pub san: String,
    /// Position after the move.
    pub fen: String,
    pub timestamp: DateTime<Utc>,
}

/// Persisted game header, everything but the move log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: GameId,
    pub white: Participant,
    pub black: Participant,
    pub mode: GameMode,
    /// Engine used when a request does not name one.
    pub ai_engine: Option<String>,
    /// Rules flag used when a request does not set one.
    pub enforce_rules: bool,
    pub status: GameStatus,
    pub created_at: DateTime<Utc>,
}

impl GameRecord {
    pub fn participant(&self, side: Color) -> &Participant {
        match side {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub white: String,
    pub black: String,
    pub mode: GameMode,
    pub status: GameStatus,
    pub move_count: usize,
    pub created_at: DateTime<Utc>,
}

/// Text forms used by storage backends.
pub mod names {
    use super::{GameMode, GameResult, Termination};

    pub fn mode(m: GameMode) -> &'static str {
        match m {
            GameMode::HumanVsAi => "human-vs-ai",
            GameMode::AiVsAi => "ai-vs-ai",
            GameMode::HumanVsHuman => "human-vs-human",
        }
    }

    pub fn parse_mode(s: &str) -> Option<GameMode> {
        [GameMode::HumanVsAi, GameMode::AiVsAi, GameMode::HumanVsHuman]
            .into_iter()
            .find(|&m| mode(m) == s)
    }

    pub fn result(r: GameResult) -> &'static str {
        match r {
            GameResult::WhiteWins => "white_wins",
            GameResult::BlackWins => "black_wins",
            GameResult::Draw => "draw",
            GameResult::Undetermined => "undetermined",
        }
    }

    pub fn parse_result(s: &str) -> Option<GameResult> {
        [
            GameResult::WhiteWins,
            GameResult::BlackWins,
            GameResult::Draw,
            GameResult::Undetermined,
        ]
        .into_iter()
        .find(|&r| result(r) == s)
    }

    pub fn termination(t: Termination) -> &'static str {
        match t {
            Termination::Checkmate => "checkmate",
            Termination::Stalemate => "stalemate",
            Termination::FiftyMoveRule => "fifty_move_rule",
            Termination::InsufficientMaterial => "insufficient_material",
            Termination::ThreefoldRepetition => "threefold_repetition",
            Termination::Resignation => "resignation",
            Termination::ManualStop => "manual_stop",
        }
    }

    pub fn parse_termination(s: &str) -> Option<Termination> {
        [
            Termination::Checkmate,
            Termination::Stalemate,
            Termination::FiftyMoveRule,
            Termination::InsufficientMaterial,
            Termination::ThreefoldRepetition,
            Termination::Resignation,
            Termination::ManualStop,
        ]
        .into_iter()
        .find(|&t| termination(t) == s)
    }
}
