use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chess_core::legal_moves;

use super::*;

/// Replays canned replies in order and records every prompt it receives.
struct ScriptedProvider {
    kind: ProviderKind,
    replies: Mutex<VecDeque<Result<String, ProviderError>>>,
    prompts: Mutex<Vec<(String, Prompt)>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    fn new(kind: ProviderKind, replies: Vec<Result<String, ProviderError>>) -> Arc<Self> {
        Arc::new(Self {
            kind,
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            delay: None,
        })
    }

    fn slow(kind: ProviderKind, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            kind,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
            delay: Some(delay),
        })
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChessProvider for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete_chess_prompt(
        &self,
        prompt: &Prompt,
        model: &str,
    ) -> Result<String, ProviderError> {
        self.prompts
            .lock()
            .unwrap()
            .push((model.to_string(), prompt.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(ProviderError::EmptyResponse))
    }
}

fn config(chain: Vec<ChainEntry>) -> PipelineConfig {
    let mut engines = BTreeMap::new();
    engines.insert("test".to_string(), chain);
    engines.insert("random".to_string(), Vec::new());
    PipelineConfig {
        engines,
        ..PipelineConfig::default()
    }
}

fn request<'a>(pos: &'a Position, history: &'a [String], engine_id: &'a str) -> DecisionRequest<'a> {
    DecisionRequest {
        position: pos,
        san_history: history,
        engine_id,
        enforce_rules: true,
    }
}

#[tokio::test]
async fn first_entry_answering_legally_wins() {
    let openai = ScriptedProvider::new(
        ProviderKind::OpenAi,
        vec![Ok("MOVE: e2e4\nREASON: center".into())],
    );
    let pipeline = MovePipeline::new(config(vec![ChainEntry::new(ProviderKind::OpenAi, "gpt-4o-mini")]))
        .with_provider(openai.clone());

    let pos = Position::startpos();
    let decision = pipeline.decide(request(&pos, &[], "test")).await.unwrap();

    assert_eq!(decision.mv.to_string(), "e2e4");
    assert_eq!(
        decision.source,
        MoveSource::Provider {
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".into()
        }
    );
    assert!(decision.failures.is_empty());
    assert_eq!(openai.calls(), 1);
}

#[tokio::test]
async fn two_failures_then_illegal_suggestion_falls_back_to_random() {
    let openai = ScriptedProvider::new(
        ProviderKind::OpenAi,
        vec![
            Err(ProviderError::Timeout),
            Err(ProviderError::RateLimited("slow down".into())),
        ],
    );
    let gemini = ScriptedProvider::new(ProviderKind::Gemini, vec![Ok("MOVE: e2e5".into())]);
    let pipeline = MovePipeline::new(config(vec![
        ChainEntry::new(ProviderKind::OpenAi, "gpt-4o-mini"),
        ChainEntry::new(ProviderKind::OpenAi, "gpt-3.5-turbo"),
        ChainEntry::new(ProviderKind::Gemini, "gemini-1.5-flash"),
    ]))
    .with_provider(openai.clone())
    .with_provider(gemini.clone());

    let pos = Position::startpos();
    let decision = pipeline.decide(request(&pos, &[], "test")).await.unwrap();

    assert_eq!(decision.source, MoveSource::RandomFallback);
    assert!(legal_moves(&pos).contains(&decision.mv));
    let errors: Vec<_> = decision.failures.iter().map(|f| f.error.clone()).collect();
    assert_eq!(
        errors,
        vec![
            AttemptError::Provider(ProviderError::Timeout),
            AttemptError::Provider(ProviderError::RateLimited("slow down".into())),
            AttemptError::Rejected("e2e5".into()),
        ]
    );
    // Each entry is tried exactly once, no retries.
    assert_eq!(openai.calls(), 2);
    assert_eq!(gemini.calls(), 1);
}

#[tokio::test]
async fn rejected_suggestion_is_listed_in_later_prompts() {
    let openai = ScriptedProvider::new(
        ProviderKind::OpenAi,
        vec![Ok("MOVE: e2e5".into()), Ok("MOVE: d2d4".into())],
    );
    let pipeline = MovePipeline::new(config(vec![
        ChainEntry::new(ProviderKind::OpenAi, "a"),
        ChainEntry::new(ProviderKind::OpenAi, "b"),
    ]))
    .with_provider(openai.clone());

    let pos = Position::startpos();
    let decision = pipeline.decide(request(&pos, &[], "test")).await.unwrap();
    assert_eq!(decision.mv.to_string(), "d2d4");

    let prompts = openai.prompts.lock().unwrap();
    assert_eq!(prompts[0].0, "a");
    assert!(!prompts[0].1.user.contains("e2e5"));
    assert_eq!(prompts[1].0, "b");
    assert!(prompts[1].1.user.contains("do not repeat them: e2e5"));
}

#[tokio::test]
async fn unparsable_reply_and_missing_provider_advance_the_chain() {
    let gemini = ScriptedProvider::new(
        ProviderKind::Gemini,
        vec![Ok("I would rather not say.".into()), Ok("Let's go with g8f6.".into())],
    );
    let pipeline = MovePipeline::new(config(vec![
        ChainEntry::new(ProviderKind::OpenAi, "gpt-4o-mini"),
        ChainEntry::new(ProviderKind::Gemini, "gemini-1.5-flash"),
        ChainEntry::new(ProviderKind::Gemini, "gemini-pro"),
    ]))
    .with_provider(gemini);

    let pos = Position::startpos().apply_move(Move::new(12, 28)).unwrap();
    let history = vec!["e4".to_string()];
    let decision = pipeline.decide(request(&pos, &history, "test")).await.unwrap();

    assert_eq!(decision.mv.to_string(), "g8f6");
    assert_eq!(decision.failures[0].error, AttemptError::NotConfigured);
    assert!(matches!(decision.failures[1].error, AttemptError::Unparsable(_)));
}

#[tokio::test]
async fn slow_provider_times_out() {
    let slow = ScriptedProvider::slow(ProviderKind::OpenAi, Duration::from_secs(5));
    let mut cfg = config(vec![ChainEntry::new(ProviderKind::OpenAi, "gpt-4o-mini")]);
    cfg.decoding.timeout_ms = 20;
    let pipeline = MovePipeline::new(cfg).with_provider(slow);

    let pos = Position::startpos();
    let decision = pipeline.decide(request(&pos, &[], "test")).await.unwrap();

    assert_eq!(decision.source, MoveSource::RandomFallback);
    assert_eq!(
        decision.failures[0].error,
        AttemptError::Provider(ProviderError::Timeout)
    );
}

#[tokio::test]
async fn unknown_engine_is_an_error() {
    let pipeline = MovePipeline::new(PipelineConfig::default());
    let pos = Position::startpos();
    let err = pipeline
        .decide(request(&pos, &[], "stockfish"))
        .await
        .unwrap_err();
    assert_eq!(err, PipelineError::UnknownEngine("stockfish".into()));
}

#[tokio::test]
async fn no_moves_is_an_error() {
    let pipeline = MovePipeline::new(PipelineConfig::default());
    let mated = Position::from_fen("r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4")
        .unwrap();
    let err = pipeline
        .decide(request(&mated, &[], "random"))
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::NoLegalMoves(_)));
}

#[tokio::test]
async fn relaxed_mode_accepts_any_move_of_own_piece() {
    let openai = ScriptedProvider::new(
        ProviderKind::OpenAi,
        vec![Ok("MOVE: e7e4".into()), Ok("MOVE: d1d5".into())],
    );
    let pipeline = MovePipeline::new(config(vec![
        ChainEntry::new(ProviderKind::OpenAi, "a"),
        ChainEntry::new(ProviderKind::OpenAi, "b"),
    ]))
    .with_provider(openai);

    let pos = Position::startpos();
    let decision = pipeline
        .decide(DecisionRequest {
            enforce_rules: false,
            ..request(&pos, &[], "test")
        })
        .await
        .unwrap();

    // e7 holds a black pawn, so only the queen leap is taken.
    assert_eq!(decision.mv.to_string(), "d1d5");
    assert_eq!(decision.failures[0].error, AttemptError::Rejected("e7e4".into()));
}
