//! AI move decisions.
//!
//! A [`MovePipeline`] turns a position into a move by asking a ranked chain of
//! (provider, model) entries for a suggestion, checking each reply against the
//! rules, and falling back to a uniformly random move when the chain runs dry.

pub mod config;
pub mod context;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod providers;

pub use config::{ChainEntry, DecodingConfig, PipelineConfig, ProviderKind};
pub use context::{AiContext, GamePhase, format_history};
pub use error::{AttemptError, PipelineError, ProviderError};
pub use parse::extract_move;
pub use pipeline::{AttemptFailure, Decision, DecisionRequest, MoveSource, MovePipeline};
pub use prompt::Prompt;
pub use provider::ChessProvider;
pub use providers::{GeminiProvider, OpenAiProvider};
