use thiserror::Error;

/// Reasons a move cannot be applied to a position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("illegal move {mv} in position {fen}")]
    Illegal { mv: String, fen: String },
    #[error("malformed move text `{0}`")]
    Malformed(String),
    #[error("no piece on {0}")]
    EmptySquare(String),
}

/// Reasons a FEN string cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 4 to 6 fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks, found {0}")]
    RankCount(usize),
    #[error("rank {rank} does not describe exactly 8 files")]
    RankWidth { rank: usize },
    #[error("invalid piece character `{0}`")]
    Piece(char),
    #[error("invalid side to move `{0}`")]
    SideToMove(String),
    #[error("invalid castling field `{0}`")]
    Castling(String),
    #[error("invalid en-passant square `{0}`")]
    EnPassant(String),
    #[error("invalid move counter `{0}`")]
    Counter(String),
}
