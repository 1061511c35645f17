use crate::{board::Position, movegen::legal_moves_into, types::Move};

/// Counts leaf nodes of the legal move tree down to `depth`.
pub fn perft(pos: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    fn walk(pos: &mut Position, depth: u8, layers: &mut [Vec<Move>]) -> u64 {
        let Some((buf, rest)) = layers.split_first_mut() else {
            return 1;
        };
        legal_moves_into(pos, buf);
        if depth == 1 {
            return buf.len() as u64;
        }

        let mut nodes = 0u64;
        for mv in buf.iter().copied() {
            let undo = pos.make_move(mv);
            nodes += walk(pos, depth - 1, rest);
            pos.unmake_move(mv, undo);
        }
        nodes
    }

    let mut scratch = pos.clone();
    let mut layers = vec![Vec::with_capacity(64); depth as usize];
    walk(&mut scratch, depth, &mut layers)
}

/// Per-move node counts at `depth`, in generation order.
pub fn divide(pos: &Position, depth: u8) -> Vec<(Move, u64)> {
    let mut scratch = pos.clone();
    let mut moves = Vec::new();
    legal_moves_into(&mut scratch, &mut moves);
    moves
        .into_iter()
        .map(|mv| {
            let undo = scratch.make_move(mv);
            let nodes = perft(&scratch, depth.saturating_sub(1));
            scratch.unmake_move(mv, undo);
            (mv, nodes)
        })
        .collect()
}
