use async_trait::async_trait;

use crate::error::StoreError;
use crate::game::Game;
use crate::model::*;

/// Everything needed to open a new game record.
#[derive(Clone, Debug)]
pub struct NewGame {
    pub white: Participant,
    pub black: Participant,
    pub mode: GameMode,
    pub ai_engine: Option<String>,
    pub enforce_rules: bool,
}

/// Persistence gateway for players, games and move logs.
///
/// Move logs are append-only: entries are written once and never rewritten.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Returns the player with `name`, creating it on first use.
    async fn upsert_player(&self, name: &str) -> Result<Player, StoreError>;

    async fn create_game(&self, new: NewGame) -> Result<GameRecord, StoreError>;

    /// Loads the header and full move log and rebuilds the game.
    async fn load_game(&self, id: GameId) -> Result<Game, StoreError>;

    /// Appends `entry` and, when `status` is finished, records the result in
    /// the same write. Either both land or neither does.
    async fn append_move(
        &self,
        id: GameId,
        entry: &MoveLogEntry,
        status: GameStatus,
    ) -> Result<(), StoreError>;

    async fn set_game_finished(
        &self,
        id: GameId,
        result: GameResult,
        termination: Termination,
    ) -> Result<(), StoreError>;

    /// Newest games first.
    async fn list_games(&self, limit: usize) -> Result<Vec<GameSummary>, StoreError>;

    async fn move_log(&self, id: GameId) -> Result<Vec<MoveLogEntry>, StoreError>;
}
