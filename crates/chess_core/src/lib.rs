//! Chess rules: board state, legal move generation, FEN, SAN and
//! game-end classification. Pure logic, no I/O.

pub mod board;
pub mod error;
pub mod fen;
pub mod movegen;
pub mod perft;
pub mod san;
pub mod status;
pub mod types;
pub mod uci;

pub use board::*;
pub use error::{FenError, MoveError};
pub use fen::STARTING_FEN;
pub use movegen::*;
pub use perft::{divide, perft};
pub use san::move_to_san;
pub use status::{PositionStatus, classify};
pub use types::*;
pub use uci::*;

