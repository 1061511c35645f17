//! HTTP arena where humans and LLM-backed engines play chess.

pub mod api;
pub mod config;
pub mod error;
pub mod service;
pub mod sqlite;
pub mod view;

pub use api::router;
pub use config::{ArenaConfig, ConfigError};
pub use error::ApiError;
pub use service::ArenaService;
pub use sqlite::SqliteStore;
