use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("request timed out")]
    Timeout,
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("model `{0}` not found")]
    ModelNotFound(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider returned no text")]
    EmptyResponse,
}

impl ProviderError {
    /// Maps a non-success HTTP status to the matching variant.
    pub fn from_status(status: u16, model: &str, body: String) -> Self {
        match status {
            401 | 403 => ProviderError::Auth(body),
            404 => ProviderError::ModelNotFound(model.to_string()),
            408 | 504 => ProviderError::Timeout,
            429 => ProviderError::RateLimited(body),
            _ => ProviderError::Status { status, body },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}

/// Why one chain entry did not produce the move.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("no move found in reply `{0}`")]
    Unparsable(String),
    #[error("suggested move {0} was rejected")]
    Rejected(String),
    #[error("provider is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("unknown AI engine `{0}`")]
    UnknownEngine(String),
    #[error("no moves available in position {0}")]
    NoLegalMoves(String),
}
