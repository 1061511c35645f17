use crate::{board::Position, error::MoveError, types::*};

pub fn move_to_uci(mv: Move) -> String {
    mv.to_string()
}

/// Parses coordinate notation (`e2e4`, `a7a8q`) without consulting a position.
/// Only `from`, `to` and `promo` are filled in.
pub fn parse_coordinate_move(txt: &str) -> Result<Move, MoveError> {
    let txt = txt.trim();
    let malformed = || MoveError::Malformed(txt.to_string());
    if !(4..=5).contains(&txt.len()) || !txt.is_ascii() {
        return Err(malformed());
    }
    let from = coord_to_sq(&txt[0..2]).ok_or_else(malformed)?;
    let to = coord_to_sq(&txt[2..4]).ok_or_else(malformed)?;
    if from == to {
        return Err(malformed());
    }
    let mut mv = Move::new(from, to);
    if let Some(ch) = txt[4..].chars().next() {
        match PieceKind::from_letter(ch) {
            Some(kind) if PieceKind::PROMOTIONS.contains(&kind) => mv.promo = Some(kind),
            _ => return Err(malformed()),
        }
    }
    Ok(mv)
}

/// Parses coordinate notation and resolves it against the legal moves of
/// `pos`, so the returned move carries correct capture/castle/en-passant flags.
pub fn parse_uci_move(pos: &Position, txt: &str) -> Option<Move> {
    let mv = parse_coordinate_move(txt).ok()?;
    pos.find_legal(mv)
}
