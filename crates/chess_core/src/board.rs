use crate::error::MoveError;
use crate::movegen::legal_moves;
use crate::types::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub wk: bool,
    pub wq: bool,
    pub bk: bool,
    pub bq: bool,
}

impl CastlingRights {
    pub const ALL: CastlingRights = CastlingRights {
        wk: true,
        wq: true,
        bk: true,
        bq: true,
    };

    pub fn any(&self) -> bool {
        self.wk || self.wq || self.bk || self.bq
    }

    fn clear_side(&mut self, c: Color) {
        match c {
            Color::White => {
                self.wk = false;
                self.wq = false;
            }
            Color::Black => {
                self.bk = false;
                self.bq = false;
            }
        }
    }

    /// Drops the right tied to a rook home square, if `sq` is one.
    fn clear_rook_square(&mut self, sq: u8) {
        match sq {
            0 => self.wq = false,
            7 => self.wk = false,
            56 => self.bq = false,
            63 => self.bk = false,
            _ => {}
        }
    }
}

/// Complete chess position, a1 = 0 through h8 = 63.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling: CastlingRights,
    pub en_passant: Option<u8>, // square behind a pawn that just advanced 2
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// Identity of a position for repetition counting. Clocks are excluded.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RepetitionKey {
    board: [Option<Piece>; 64],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<u8>,
}

#[derive(Clone, Debug)]
pub(crate) struct Undo {
    captured: Option<Piece>,
    castling: CastlingRights,
    en_passant: Option<u8>,
    halfmove_clock: u32,
    fullmove_number: u32,
    moved_piece: Piece,
    rook_move: Option<(u8, u8)>,
    ep_captured_sq: Option<u8>,
}

pub(crate) const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (-1, 2),
    (-2, 1),
    (1, -2),
    (2, -1),
    (-1, -2),
    (-2, -1),
];
pub(crate) const KING_DELTAS: [(i8, i8); 8] = [
    (1, 1),
    (1, 0),
    (1, -1),
    (0, 1),
    (0, -1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];
pub(crate) const DIAGONALS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub(crate) const ORTHOGONALS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Rook squares moved by a castling king, keyed on the king's path.
fn castle_rook_squares(color: Color, from: u8, to: u8) -> Option<(u8, u8)> {
    match (color, from, to) {
        (Color::White, 4, 6) => Some((7, 5)),
        (Color::White, 4, 2) => Some((0, 3)),
        (Color::Black, 60, 62) => Some((63, 61)),
        (Color::Black, 60, 58) => Some((56, 59)),
        _ => None,
    }
}

impl Position {
    pub fn empty() -> Self {
        Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling: CastlingRights::default(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn startpos() -> Self {
        let mut p = Position {
            castling: CastlingRights::ALL,
            ..Position::empty()
        };

        let back = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];
        for (f, &kind) in back.iter().enumerate() {
            p.board[f] = Some(Piece::new(Color::White, kind));
            p.board[8 + f] = Some(Piece::new(Color::White, PieceKind::Pawn));
            p.board[48 + f] = Some(Piece::new(Color::Black, PieceKind::Pawn));
            p.board[56 + f] = Some(Piece::new(Color::Black, kind));
        }
        p
    }

    pub fn king_sq(&self, c: Color) -> Option<u8> {
        let king = Some(Piece::new(c, PieceKind::King));
        (0..64u8).find(|&s| self.board[s as usize] == king)
    }

    pub fn piece_at(&self, sq: u8) -> Option<Piece> {
        self.board[sq as usize]
    }
    pub fn set_piece(&mut self, sq: u8, pc: Option<Piece>) {
        self.board[sq as usize] = pc;
    }

    /// Occupied squares with their pieces, a1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (u8, Piece)> + '_ {
        self.board
            .iter()
            .enumerate()
            .filter_map(|(i, pc)| pc.map(|p| (i as u8, p)))
    }

    /// A side without a king is never in check; this keeps rules-relaxed
    /// positions classifiable.
    pub fn in_check(&self, c: Color) -> bool {
        match self.king_sq(c) {
            Some(ksq) => self.is_square_attacked(ksq, c.other()),
            None => false,
        }
    }

    fn holds(&self, s: Option<u8>, by: Color, kinds: &[PieceKind]) -> bool {
        match s.and_then(|s| self.piece_at(s)) {
            Some(pc) => pc.color == by && kinds.contains(&pc.kind),
            None => false,
        }
    }

    fn ray_hits(&self, target: u8, by: Color, dirs: &[(i8, i8)], kinds: &[PieceKind]) -> bool {
        let (tf, tr) = (file_of(target), rank_of(target));
        for &(df, dr) in dirs {
            let (mut f, mut r) = (tf + df, tr + dr);
            while let Some(s) = sq(f, r) {
                if let Some(pc) = self.piece_at(s) {
                    if pc.color == by && kinds.contains(&pc.kind) {
                        return true;
                    }
                    break;
                }
                f += df;
                r += dr;
            }
        }
        false
    }

    pub fn is_square_attacked(&self, target: u8, by: Color) -> bool {
        let (tf, tr) = (file_of(target), rank_of(target));

        // A pawn attacks from one rank behind its direction of travel.
        let behind = -by.forward();
        if self.holds(sq(tf - 1, tr + behind), by, &[PieceKind::Pawn])
            || self.holds(sq(tf + 1, tr + behind), by, &[PieceKind::Pawn])
        {
            return true;
        }

        let steppers = [
            (&KNIGHT_DELTAS, PieceKind::Knight),
            (&KING_DELTAS, PieceKind::King),
        ];
        for (deltas, kind) in steppers {
            if deltas
                .iter()
                .any(|&(df, dr)| self.holds(sq(tf + df, tr + dr), by, &[kind]))
            {
                return true;
            }
        }

        self.ray_hits(target, by, &DIAGONALS, &[PieceKind::Bishop, PieceKind::Queen])
            || self.ray_hits(target, by, &ORTHOGONALS, &[PieceKind::Rook, PieceKind::Queen])
    }

    /// The en-passant square only counts when a capture onto it is legal.
    pub fn repetition_key(&self) -> RepetitionKey {
        let en_passant = self
            .en_passant
            .filter(|_| legal_moves(self).iter().any(|m| m.is_en_passant));
        RepetitionKey {
            board: self.board,
            side_to_move: self.side_to_move,
            castling: self.castling,
            en_passant,
        }
    }

    /// Finds the legal move matching `mv` by squares and promotion piece.
    /// A pawn reaching the last rank without a promotion piece promotes to a queen.
    pub fn find_legal(&self, mv: Move) -> Option<Move> {
        if mv.from > 63 || mv.to > 63 {
            return None;
        }
        let wanted = Move {
            promo: mv.promo.or_else(|| self.implied_promotion(mv)),
            ..mv
        };
        legal_moves(self).into_iter().find(|m| m.same_squares(&wanted))
    }

    fn implied_promotion(&self, mv: Move) -> Option<PieceKind> {
        let pc = self.piece_at(mv.from)?;
        let last_rank = pc.color.other().back_rank();
        (pc.kind == PieceKind::Pawn && rank_of(mv.to) == last_rank).then_some(PieceKind::Queen)
    }

    /// Applies a legal move and returns the resulting position.
    pub fn apply_move(&self, mv: Move) -> Result<Position, MoveError> {
        let legal = self.find_legal(mv).ok_or_else(|| MoveError::Illegal {
            mv: mv.to_string(),
            fen: self.to_fen(),
        })?;
        let mut next = self.clone();
        next.make_move(legal);
        Ok(next)
    }

    /// Applies a move with rules relaxed: the from-square only has to be
    /// occupied. Castling and en-passant side effects follow the move's shape.
    pub fn apply_relaxed(&self, mv: Move) -> Result<Position, MoveError> {
        if mv.from == mv.to || mv.from > 63 || mv.to > 63 {
            return Err(MoveError::Malformed(mv.to_string()));
        }
        let moved = self
            .piece_at(mv.from)
            .ok_or_else(|| MoveError::EmptySquare(sq_to_coord(mv.from)))?;

        let shaped = match self.find_legal(mv) {
            Some(legal) => legal,
            None => self.shape_relaxed(mv, moved),
        };
        let mut next = self.clone();
        next.make_move(shaped);
        Ok(next)
    }

    fn shape_relaxed(&self, mv: Move, moved: Piece) -> Move {
        let mut shaped = Move::new(mv.from, mv.to);
        shaped.promo = mv.promo;
        shaped.is_capture = self.piece_at(mv.to).is_some();
        match moved.kind {
            PieceKind::King => {
                let rook = Some(Piece::new(moved.color, PieceKind::Rook));
                shaped.is_castle = castle_rook_squares(moved.color, mv.from, mv.to)
                    .is_some_and(|(rf, _)| self.piece_at(rf) == rook);
            }
            PieceKind::Pawn => {
                let diagonal = file_of(mv.from) != file_of(mv.to);
                shaped.is_en_passant =
                    diagonal && !shaped.is_capture && self.en_passant == Some(mv.to);
                shaped.is_capture |= shaped.is_en_passant;
            }
            _ => {}
        }
        shaped
    }

    pub(crate) fn make_move(&mut self, mv: Move) -> Undo {
        let (from, to) = (mv.from, mv.to);
        let moved = self.piece_at(from).expect("no piece on from-square");
        let mut captured = self.piece_at(to);
        let undo_base = (
            self.castling,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number,
        );

        self.en_passant = None;
        let mut reset_hmc = moved.kind == PieceKind::Pawn || captured.is_some();

        let mut ep_captured_sq = None;
        if mv.is_en_passant {
            // The captured pawn sits beside the mover, behind the target square.
            if let Some(cs) = sq(file_of(to), rank_of(to) - moved.color.forward()) {
                captured = self.piece_at(cs);
                self.set_piece(cs, None);
                ep_captured_sq = Some(cs);
                reset_hmc = true;
            }
        }

        self.set_piece(from, None);
        self.set_piece(to, Some(moved));

        if moved.kind == PieceKind::Pawn && rank_of(to) == moved.color.other().back_rank() {
            let promo = mv.promo.unwrap_or(PieceKind::Queen);
            self.set_piece(to, Some(Piece::new(moved.color, promo)));
        }

        let mut rook_move = None;
        if mv.is_castle && moved.kind == PieceKind::King {
            if let Some((rf, rt)) = castle_rook_squares(moved.color, from, to) {
                if let Some(rook) = self.piece_at(rf) {
                    self.set_piece(rf, None);
                    self.set_piece(rt, Some(rook));
                    rook_move = Some((rf, rt));
                }
            }
        }

        if moved.kind == PieceKind::King {
            self.castling.clear_side(moved.color);
        }
        if moved.kind == PieceKind::Rook {
            self.castling.clear_rook_square(from);
        }
        if captured.is_some_and(|cp| cp.kind == PieceKind::Rook) {
            self.castling.clear_rook_square(to);
        }

        if moved.kind == PieceKind::Pawn && (rank_of(to) - rank_of(from)).abs() == 2 {
            self.en_passant = sq(file_of(from), (rank_of(from) + rank_of(to)) / 2);
        }

        self.halfmove_clock = if reset_hmc {
            0
        } else {
            self.halfmove_clock + 1
        };
        if self.side_to_move == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.other();

        let (castling, en_passant, halfmove_clock, fullmove_number) = undo_base;
        Undo {
            captured,
            castling,
            en_passant,
            halfmove_clock,
            fullmove_number,
            moved_piece: moved,
            rook_move,
            ep_captured_sq,
        }
    }

    pub(crate) fn unmake_move(&mut self, mv: Move, undo: Undo) {
        self.side_to_move = self.side_to_move.other();
        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;

        if let Some((rf, rt)) = undo.rook_move {
            let rook = self.piece_at(rt);
            self.set_piece(rt, None);
            self.set_piece(rf, rook);
        }

        // Restoring the moved piece also undoes any promotion.
        self.set_piece(mv.to, None);
        self.set_piece(mv.from, Some(undo.moved_piece));

        match undo.ep_captured_sq {
            Some(cs) => self.set_piece(cs, undo.captured),
            None => self.set_piece(mv.to, undo.captured),
        }
    }
}

#[cfg(test)]
#[path = "board_tests.rs"]
mod board_tests;
