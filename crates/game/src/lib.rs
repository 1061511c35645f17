//! Game lifecycle on top of `chess_core`.
//!
//! A [`Game`] owns the move log and the position it leads to and enforces
//! turn order and the finished state. Storage goes through [`GameStore`].

pub mod error;
pub mod game;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{GameError, StoreError};
pub use game::{AiMove, Game, MoveOutcome};
pub use memory::MemoryStore;
pub use model::*;
pub use store::{GameStore, NewGame};
