use std::fmt::Write as _;

use crate::config::DecodingConfig;
use crate::context::{AiContext, GamePhase};

/// A provider-agnostic request: system instructions, user message and
/// decoding parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Prompt {
    pub fn for_context(ctx: &AiContext, decoding: &DecodingConfig) -> Prompt {
        Prompt {
            system: system_message(ctx),
            user: user_message(ctx),
            temperature: decoding.temperature,
            max_tokens: decoding.max_tokens,
        }
    }
}

fn system_message(ctx: &AiContext) -> String {
    format!(
        "You are a chess player controlling the {side} pieces. \
         Always answer in exactly this format:\n\
         MOVE: <move in coordinate notation, e.g. e2e4 or e7e8q>\n\
         REASON: <one short sentence>",
        side = ctx.side_to_move
    )
}

fn phase_hint(phase: GamePhase) -> &'static str {
    match phase {
        GamePhase::Opening => "Develop pieces, fight for the center and keep the king safe.",
        GamePhase::Middlegame => "Look for tactics, coordinate pieces and protect loose ones.",
        GamePhase::Endgame => "Activate the king and push passed pawns.",
    }
}

fn user_message(ctx: &AiContext) -> String {
    let mut msg = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(msg, "Position (FEN): {}", ctx.fen);
    let _ = writeln!(msg, "You play: {}", ctx.side_to_move);
    let _ = writeln!(msg, "Game phase: {} ({} plies played)", ctx.phase, ctx.ply_count);
    let _ = writeln!(msg, "Moves so far: {}", ctx.history);
    if ctx.in_check {
        let _ = writeln!(msg, "Your king is in check and must be defended.");
    }
    if !ctx.threatened.is_empty() {
        let _ = writeln!(msg, "Your pieces under attack: {}", ctx.threatened.join(", "));
    }
    let _ = writeln!(msg, "Legal moves: {}", ctx.legal_moves.join(" "));
    if !ctx.rejected.is_empty() {
        let _ = writeln!(
            msg,
            "These suggestions were rejected, do not repeat them: {}",
            ctx.rejected.join(" ")
        );
    }
    let _ = writeln!(msg, "{}", phase_hint(ctx.phase));
    msg.push_str("Choose one move from the legal moves list.");
    msg
}
