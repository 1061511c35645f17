//! Pulling a move out of free-form provider text.
//!
//! Replies are asked to carry a `MOVE: e2e4` line. Models do not always comply,
//! so the parser also accepts the first coordinate token anywhere in the text
//! and, failing that, castling written as `O-O` / `O-O-O`.

use chess_core::{Color, Move, parse_coordinate_move};

pub fn extract_move(text: &str, side: Color) -> Option<Move> {
    if let Some(mv) = structured_move(text, side) {
        return Some(mv);
    }
    first_coordinate_token(text).or_else(|| castling_notation(text, side))
}

fn structured_move(text: &str, side: Color) -> Option<Move> {
    text.lines().find_map(|line| {
        let line = line.trim().trim_matches(|c: char| c == '*' || c == '`' || c == '#').trim();
        let rest = strip_prefix_ignore_case(line, "move:")?;
        first_coordinate_token(rest).or_else(|| castling_notation(rest, side))
    })
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Matches `[a-h][1-8][a-h][1-8][qrbn]?` on word boundaries, case-insensitively.
fn first_coordinate_token(text: &str) -> Option<Move> {
    let bytes = text.as_bytes();
    let at = |i: usize| bytes.get(i).map(|b| b.to_ascii_lowercase());
    let file = |b: Option<u8>| b.is_some_and(|b| (b'a'..=b'h').contains(&b));
    let rank = |b: Option<u8>| b.is_some_and(|b| (b'1'..=b'8').contains(&b));
    let boundary = |i: usize| bytes.get(i).is_none_or(|&b| !is_word_byte(b));

    for start in 0..bytes.len() {
        if start > 0 && is_word_byte(bytes[start - 1]) {
            continue;
        }
        if !(file(at(start)) && rank(at(start + 1)) && file(at(start + 2)) && rank(at(start + 3))) {
            continue;
        }
        let promo = at(start + 4).is_some_and(|b| b"qrbn".contains(&b));
        let len = if promo && boundary(start + 5) {
            5
        } else if boundary(start + 4) {
            4
        } else {
            continue;
        };
        // The token is pure ASCII, so slicing on these offsets is safe.
        let token = text[start..start + len].to_ascii_lowercase();
        if let Ok(mv) = parse_coordinate_move(&token) {
            return Some(mv);
        }
    }
    None
}

fn castling_notation(text: &str, side: Color) -> Option<Move> {
    let normalized = text.to_ascii_uppercase().replace('0', "O");
    let king_from = match side {
        Color::White => "e1",
        Color::Black => "e8",
    };
    let target = if normalized.contains("O-O-O") {
        'c'
    } else if normalized.contains("O-O") {
        'g'
    } else {
        return None;
    };
    let rank = &king_from[1..];
    parse_coordinate_move(&format!("{king_from}{target}{rank}")).ok()
}

#[cfg(test)]
#[path = "parse_tests.rs"]
mod parse_tests;
