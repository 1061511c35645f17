use std::collections::HashMap;
use std::sync::Arc;

use chess_core::{Move, Position};
use random_engine::RandomEngine;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ChainEntry, PipelineConfig, ProviderKind};
use crate::context::AiContext;
use crate::error::{AttemptError, PipelineError, ProviderError};
use crate::parse::extract_move;
use crate::prompt::Prompt;
use crate::provider::ChessProvider;

/// Input for one AI move decision.
#[derive(Clone, Copy, Debug)]
pub struct DecisionRequest<'a> {
    pub position: &'a Position,
    /// SAN of every move played so far.
    pub san_history: &'a [String],
    pub engine_id: &'a str,
    pub enforce_rules: bool,
}

/// Where the chosen move came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MoveSource {
    Provider { provider: ProviderKind, model: String },
    RandomFallback,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptFailure {
    pub provider: ProviderKind,
    pub model: String,
    pub error: AttemptError,
}

#[derive(Clone, Debug)]
pub struct Decision {
    pub mv: Move,
    pub source: MoveSource,
    /// Chain entries that did not produce the move, in order.
    pub failures: Vec<AttemptFailure>,
}

/// Walks an engine's provider chain and falls back to a random move.
pub struct MovePipeline {
    config: PipelineConfig,
    providers: HashMap<ProviderKind, Arc<dyn ChessProvider>>,
}

impl MovePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            providers: HashMap::new(),
        }
    }

    /// Registers a backend under its own kind, replacing any earlier one.
    pub fn with_provider(mut self, provider: Arc<dyn ChessProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn knows_engine(&self, engine_id: &str) -> bool {
        self.config.chain(engine_id).is_some()
    }

    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Produces a move for the side to move.
    ///
    /// Provider failures are recorded in the decision, never returned. The only
    /// errors are an unknown engine id and a position without any move.
    pub async fn decide(&self, req: DecisionRequest<'_>) -> Result<Decision, PipelineError> {
        let chain = self
            .config
            .chain(req.engine_id)
            .ok_or_else(|| PipelineError::UnknownEngine(req.engine_id.to_string()))?;

        let mut ctx = AiContext::build(req.position, req.san_history);
        let mut failures = Vec::new();

        for entry in chain {
            match self.attempt(entry, &ctx, req).await {
                Ok(mv) => {
                    info!(
                        engine = req.engine_id,
                        provider = %entry.provider,
                        model = %entry.model,
                        mv = %mv,
                        "provider move accepted"
                    );
                    return Ok(Decision {
                        mv,
                        source: MoveSource::Provider {
                            provider: entry.provider,
                            model: entry.model.clone(),
                        },
                        failures,
                    });
                }
                Err(error) => {
                    warn!(
                        engine = req.engine_id,
                        provider = %entry.provider,
                        model = %entry.model,
                        error = %error,
                        "chain entry failed"
                    );
                    if let AttemptError::Rejected(suggestion) = &error {
                        ctx.reject(suggestion.clone());
                    }
                    failures.push(AttemptFailure {
                        provider: entry.provider,
                        model: entry.model.clone(),
                        error,
                    });
                }
            }
        }

        let random = if req.enforce_rules {
            RandomEngine::new()
        } else {
            RandomEngine::relaxed()
        };
        let mv = random
            .choose(req.position)
            .ok_or_else(|| PipelineError::NoLegalMoves(req.position.to_fen()))?;
        info!(engine = req.engine_id, mv = %mv, attempts = failures.len(), "random fallback move");
        Ok(Decision {
            mv,
            source: MoveSource::RandomFallback,
            failures,
        })
    }

    async fn attempt(
        &self,
        entry: &ChainEntry,
        ctx: &AiContext,
        req: DecisionRequest<'_>,
    ) -> Result<Move, AttemptError> {
        let provider = self
            .providers
            .get(&entry.provider)
            .ok_or(AttemptError::NotConfigured)?;

        let decoding = &self.config.decoding;
        let prompt = Prompt::for_context(ctx, decoding);
        let reply = tokio::time::timeout(
            decoding.timeout(),
            provider.complete_chess_prompt(&prompt, &entry.model),
        )
        .await
        .map_err(|_| ProviderError::Timeout)??;
        debug!(provider = %entry.provider, model = %entry.model, reply = %reply, "provider reply");

        let pos = req.position;
        let suggestion = extract_move(&reply, pos.side_to_move)
            .ok_or_else(|| AttemptError::Unparsable(reply.clone()))?;
        validate(pos, suggestion, req.enforce_rules)
            .ok_or_else(|| AttemptError::Rejected(suggestion.to_string()))
    }
}

/// Enforced play needs a legal move. Relaxed play takes any move that starts
/// from one of the mover's pieces.
fn validate(pos: &Position, suggestion: Move, enforce_rules: bool) -> Option<Move> {
    if let Some(legal) = pos.find_legal(suggestion) {
        return Some(legal);
    }
    if enforce_rules {
        return None;
    }
    pos.piece_at(suggestion.from)
        .filter(|pc| pc.color == pos.side_to_move)
        .map(|_| suggestion)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;
