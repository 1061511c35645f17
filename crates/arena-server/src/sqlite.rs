use std::str::FromStr;

use async_trait::async_trait;
use chess_core::Color;
use chrono::Utc;
use game::model::names;
use game::{
    Controller, Game, GameId, GameMode, GameRecord, GameResult, GameStatus, GameStore,
    GameSummary, MoveLogEntry, NewGame, Participant, Player, StoreError, Termination,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS players (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS games (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        white_id INTEGER NOT NULL REFERENCES players(id),
        black_id INTEGER NOT NULL REFERENCES players(id),
        white_engine TEXT,
        black_engine TEXT,
        mode TEXT NOT NULL,
        ai_engine TEXT,
        enforce_rules INTEGER NOT NULL,
        result TEXT NOT NULL DEFAULT 'undetermined',
        termination TEXT,
        created_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS moves (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        game_id INTEGER NOT NULL REFERENCES games(id),
        ply INTEGER NOT NULL,
        side TEXT NOT NULL,
        uci TEXT NOT NULL,
        san TEXT NOT NULL,
        fen TEXT NOT NULL,
        created_at TEXT NOT NULL,
        UNIQUE (game_id, ply)
    )",
];

const GAME_COLUMNS: &str = "g.id, g.mode, g.ai_engine, g.enforce_rules, g.result, g.termination,
    g.created_at, g.white_id, w.name AS white_name, g.white_engine,
    g.black_id, b.name AS black_name, g.black_engine
    FROM games g
    JOIN players w ON w.id = g.white_id
    JOIN players b ON b.id = g.black_id";

/// SQLite-backed [`GameStore`]. A human side is stored as a NULL engine.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn corrupt(what: &str, value: &str) -> StoreError {
    StoreError::Corrupt(format!("unknown {what} `{value}`"))
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `url` and applies the schema.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(backend)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(backend)?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database. One connection that never expires, so the
    /// data lives as long as the store.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .map_err(backend)?;
        Self::with_pool(pool).await
    }

    pub async fn with_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&pool).await.map_err(backend)?;
        }
        debug!("sqlite schema ready");
        Ok(Self { pool })
    }

    async fn ensure_game(&self, id: GameId) -> Result<(), StoreError> {
        sqlx::query("SELECT 1 FROM games WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }
}

async fn write_finished(
    conn: &mut SqliteConnection,
    id: GameId,
    result: GameResult,
    termination: Termination,
) -> Result<(), StoreError> {
    let done = sqlx::query("UPDATE games SET result = ?, termination = ? WHERE id = ?")
        .bind(names::result(result))
        .bind(names::termination(termination))
        .bind(id)
        .execute(conn)
        .await
        .map_err(backend)?;
    if done.rows_affected() == 0 {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

fn controller(engine: Option<String>) -> Controller {
    match engine {
        Some(engine) => Controller::Ai { engine },
        None => Controller::Human,
    }
}

fn decode_status(result: &str, termination: Option<&str>) -> Result<GameStatus, StoreError> {
    let Some(termination) = termination else {
        return Ok(GameStatus::InProgress);
    };
    Ok(GameStatus::Finished {
        result: names::parse_result(result).ok_or_else(|| corrupt("result", result))?,
        termination: names::parse_termination(termination)
            .ok_or_else(|| corrupt("termination", termination))?,
    })
}

fn decode_mode(mode: &str) -> Result<GameMode, StoreError> {
    names::parse_mode(mode).ok_or_else(|| corrupt("mode", mode))
}

fn col<'r, T>(row: &'r SqliteRow, name: &str) -> Result<T, StoreError>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get(name).map_err(backend)
}

fn decode_participant(row: &SqliteRow, side: &str) -> Result<Participant, StoreError> {
    Ok(Participant {
        player_id: col(row, &format!("{side}_id"))?,
        name: col(row, &format!("{side}_name"))?,
        controller: controller(col(row, &format!("{side}_engine"))?),
    })
}

fn decode_record(row: &SqliteRow) -> Result<GameRecord, StoreError> {
    let mode: String = col(row, "mode")?;
    let result: String = col(row, "result")?;
    let termination: Option<String> = col(row, "termination")?;
    Ok(GameRecord {
        id: col(row, "id")?,
        white: decode_participant(row, "white")?,
        black: decode_participant(row, "black")?,
        mode: decode_mode(&mode)?,
        ai_engine: col(row, "ai_engine")?,
        enforce_rules: col(row, "enforce_rules")?,
        status: decode_status(&result, termination.as_deref())?,
        created_at: col(row, "created_at")?,
    })
}

fn decode_move(row: &SqliteRow) -> Result<MoveLogEntry, StoreError> {
    let side: String = col(row, "side")?;
    let side = match side.as_str() {
        "white" => Color::White,
        "black" => Color::Black,
        other => return Err(corrupt("side", other)),
    };
    let ply: i64 = col(row, "ply")?;
    Ok(MoveLogEntry {
        ply: u32::try_from(ply).map_err(|_| corrupt("ply", &ply.to_string()))?,
        side,
        uci: col(row, "uci")?,
        san: col(row, "san")?,
        fen: col(row, "fen")?,
        timestamp: col(row, "created_at")?,
    })
}

#[async_trait]
impl GameStore for SqliteStore {
    async fn upsert_player(&self, name: &str) -> Result<Player, StoreError> {
        sqlx::query("INSERT INTO players (name, created_at) VALUES (?, ?) ON CONFLICT(name) DO NOTHING")
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        let row = sqlx::query("SELECT id, name FROM players WHERE name = ?")
            .bind(name)
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(Player {
            id: col(&row, "id")?,
            name: col(&row, "name")?,
        })
    }

    async fn create_game(&self, new: NewGame) -> Result<GameRecord, StoreError> {
        let created_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO games (white_id, black_id, white_engine, black_engine, mode, ai_engine,
                enforce_rules, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(new.white.player_id)
        .bind(new.black.player_id)
        .bind(new.white.controller.engine())
        .bind(new.black.controller.engine())
        .bind(names::mode(new.mode))
        .bind(new.ai_engine.as_deref())
        .bind(new.enforce_rules)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?
        .last_insert_rowid();
        debug!(game = id, mode = names::mode(new.mode), "game created");

        Ok(GameRecord {
            id,
            white: new.white,
            black: new.black,
            mode: new.mode,
            ai_engine: new.ai_engine,
            enforce_rules: new.enforce_rules,
            status: GameStatus::InProgress,
            created_at,
        })
    }

    async fn load_game(&self, id: GameId) -> Result<Game, StoreError> {
        let row = sqlx::query(&format!("SELECT {GAME_COLUMNS} WHERE g.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound(id))?;
        let record = decode_record(&row)?;
        let moves = self.move_log(id).await?;
        Game::restore(record, moves)
    }

    async fn append_move(
        &self,
        id: GameId,
        entry: &MoveLogEntry,
        status: GameStatus,
    ) -> Result<(), StoreError> {
        self.ensure_game(id).await?;
        let mut tx = self.pool.begin().await.map_err(backend)?;
        sqlx::query(
            "INSERT INTO moves (game_id, ply, side, uci, san, fen, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(i64::from(entry.ply))
        .bind(entry.side.to_string())
        .bind(&entry.uci)
        .bind(&entry.san)
        .bind(&entry.fen)
        .bind(entry.timestamp)
        .execute(&mut *tx)
        .await
        .map_err(backend)?;
        if let GameStatus::Finished {
            result,
            termination,
        } = status
        {
            write_finished(&mut *tx, id, result, termination).await?;
        }
        tx.commit().await.map_err(backend)
    }

    async fn set_game_finished(
        &self,
        id: GameId,
        result: GameResult,
        termination: Termination,
    ) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        write_finished(&mut *conn, id, result, termination).await
    }

    async fn list_games(&self, limit: usize) -> Result<Vec<GameSummary>, StoreError> {
        let rows = sqlx::query(
            "SELECT g.id, w.name AS white_name, b.name AS black_name, g.mode, g.result,
                g.termination, g.created_at,
                (SELECT COUNT(*) FROM moves m WHERE m.game_id = g.id) AS move_count
             FROM games g
             JOIN players w ON w.id = g.white_id
             JOIN players b ON b.id = g.black_id
             ORDER BY g.id DESC
             LIMIT ?",
        )
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.iter()
            .map(|row| -> Result<GameSummary, StoreError> {
                let mode: String = col(row, "mode")?;
                let result: String = col(row, "result")?;
                let termination: Option<String> = col(row, "termination")?;
                let move_count: i64 = col(row, "move_count")?;
                Ok(GameSummary {
                    id: col(row, "id")?,
                    white: col(row, "white_name")?,
                    black: col(row, "black_name")?,
                    mode: decode_mode(&mode)?,
                    status: decode_status(&result, termination.as_deref())?,
                    move_count: move_count as usize,
                    created_at: col(row, "created_at")?,
                })
            })
            .collect()
    }

    async fn move_log(&self, id: GameId) -> Result<Vec<MoveLogEntry>, StoreError> {
        self.ensure_game(id).await?;
        let rows = sqlx::query(
            "SELECT ply, side, uci, san, fen, created_at FROM moves WHERE game_id = ? ORDER BY ply",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;
        rows.iter().map(decode_move).collect()
    }
}

#[cfg(test)]
#[path = "sqlite_tests.rs"]
mod sqlite_tests;
