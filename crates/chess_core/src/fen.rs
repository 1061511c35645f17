//! Forsyth-Edwards Notation, the canonical text form of a [`Position`].

use std::fmt;
use std::str::FromStr;

use crate::board::{CastlingRights, Position};
use crate::error::FenError;
use crate::types::*;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Decodes a FEN string. The two move counters are optional and default to `0 1`.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut pos = Position::empty();
        parse_placement(fields[0], &mut pos)?;

        pos.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };
        pos.castling = parse_castling(fields[2])?;
        pos.en_passant = match fields[3] {
            "-" => None,
            coord => Some(
                coord_to_sq(coord)
                    .filter(|&s| rank_of(s) == 2 || rank_of(s) == 5)
                    .ok_or_else(|| FenError::EnPassant(coord.to_string()))?,
            ),
        };
        pos.halfmove_clock = parse_counter(fields.get(4).copied().unwrap_or("0"))?;
        pos.fullmove_number = parse_counter(fields.get(5).copied().unwrap_or("1"))?;
        Ok(pos)
    }

    pub fn to_fen(&self) -> String {
        let mut out = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match sq(file, rank).and_then(|s| self.piece_at(s)) {
                    Some(pc) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(pc.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
            if rank > 0 {
                out.push('/');
            }
        }

        out.push(' ');
        out.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        out.push(' ');
        if self.castling.any() {
            let c = self.castling;
            for (held, ch) in [(c.wk, 'K'), (c.wq, 'Q'), (c.bk, 'k'), (c.bq, 'q')] {
                if held {
                    out.push(ch);
                }
            }
        } else {
            out.push('-');
        }

        out.push(' ');
        match self.en_passant {
            Some(s) => out.push_str(&sq_to_coord(s)),
            None => out.push('-'),
        }

        out.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        out
    }
}

fn parse_placement(field: &str, pos: &mut Position) -> Result<(), FenError> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    // FEN lists rank 8 first.
    for (idx, row) in ranks.iter().enumerate() {
        let rank = 7 - idx as i8;
        let mut file: i8 = 0;
        for ch in row.chars() {
            if let Some(d) = ch.to_digit(10) {
                if d == 0 || d > 8 {
                    return Err(FenError::RankWidth { rank: 8 - idx });
                }
                file += d as i8;
            } else {
                let pc = Piece::from_fen_char(ch).ok_or(FenError::Piece(ch))?;
                let s = sq(file, rank).ok_or(FenError::RankWidth { rank: 8 - idx })?;
                pos.set_piece(s, Some(pc));
                file += 1;
            }
            if file > 8 {
                return Err(FenError::RankWidth { rank: 8 - idx });
            }
        }
        if file != 8 {
            return Err(FenError::RankWidth { rank: 8 - idx });
        }
    }
    Ok(())
}

fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::default();
    if field == "-" {
        return Ok(rights);
    }
    for c in field.chars() {
        match c {
            'K' => rights.wk = true,
            'Q' => rights.wq = true,
            'k' => rights.bk = true,
            'q' => rights.bq = true,
            _ => return Err(FenError::Castling(field.to_string())),
        }
    }
    Ok(rights)
}

fn parse_counter(field: &str) -> Result<u32, FenError> {
    field
        .parse()
        .map_err(|_| FenError::Counter(field.to_string()))
}

impl FromStr for Position {
    type Err = FenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Position::from_fen(s)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

#[cfg(test)]
#[path = "fen_tests.rs"]
mod fen_tests;
