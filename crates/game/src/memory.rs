use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::game::Game;
use crate::model::*;
use crate::store::{GameStore, NewGame};

/// Process-local store, used by tests and `--memory` runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    players: Vec<Player>,
    games: BTreeMap<GameId, StoredGame>,
    next_id: GameId,
}

struct StoredGame {
    record: GameRecord,
    moves: Vec<MoveLogEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn game_mut(&mut self, id: GameId) -> Result<&mut StoredGame, StoreError> {
        self.games.get_mut(&id).ok_or(StoreError::NotFound(id))
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn upsert_player(&self, name: &str) -> Result<Player, StoreError> {
        let mut inner = self.inner.lock().await;
        if let Some(p) = inner.players.iter().find(|p| p.name == name) {
            return Ok(p.clone());
        }
        let player = Player {
            id: inner.players.len() as PlayerId + 1,
            name: name.to_string(),
        };
        inner.players.push(player.clone());
        Ok(player)
    }

    async fn create_game(&self, new: NewGame) -> Result<GameRecord, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let record = GameRecord {
            id: inner.next_id,
            white: new.white,
            black: new.black,
            mode: new.mode,
            ai_engine: new.ai_engine,
            enforce_rules: new.enforce_rules,
            status: GameStatus::InProgress,
            created_at: Utc::now(),
        };
        inner.games.insert(
            record.id,
            StoredGame {
                record: record.clone(),
                moves: Vec::new(),
            },
        );
        Ok(record)
    }

    async fn load_game(&self, id: GameId) -> Result<Game, StoreError> {
        let inner = self.inner.lock().await;
        let stored = inner.games.get(&id).ok_or(StoreError::NotFound(id))?;
        Game::restore(stored.record.clone(), stored.moves.clone())
    }

    async fn append_move(
        &self,
        id: GameId,
        entry: &MoveLogEntry,
        status: GameStatus,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let stored = inner.game_mut(id)?;
        let expected = stored.moves.len() as u32 + 1;
        if entry.ply != expected {
            return Err(StoreError::Backend(format!(
                "game {id}: ply {} already recorded or out of order, expected {expected}",
                entry.ply
            )));
        }
        stored.moves.push(entry.clone());
        if status.is_finished() {
            stored.record.status = status;
        }
        Ok(())
    }

    async fn set_game_finished(
        &self,
        id: GameId,
        result: GameResult,
        termination: Termination,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.game_mut(id)?.record.status = GameStatus::Finished {
            result,
            termination,
        };
        Ok(())
    }

    async fn list_games(&self, limit: usize) -> Result<Vec<GameSummary>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .games
            .values()
            .rev()
            .take(limit)
            .map(|g| GameSummary {
                id: g.record.id,
                white: g.record.white.name.clone(),
                black: g.record.black.name.clone(),
                mode: g.record.mode,
                status: g.record.status,
                move_count: g.moves.len(),
                created_at: g.record.created_at,
            })
            .collect())
    }

    async fn move_log(&self, id: GameId) -> Result<Vec<MoveLogEntry>, StoreError> {
        let inner = self.inner.lock().await;
        let stored = inner.games.get(&id).ok_or(StoreError::NotFound(id))?;
        Ok(stored.moves.clone())
    }
}
