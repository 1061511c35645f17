use async_trait::async_trait;

use crate::config::ProviderKind;
use crate::error::ProviderError;
use crate::prompt::Prompt;

/// A text-completion backend able to answer chess prompts.
///
/// Implementations make exactly one request per call. Timeouts, retries across
/// models and fallback are the pipeline's business.
#[async_trait]
pub trait ChessProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    async fn complete_chess_prompt(
        &self,
        prompt: &Prompt,
        model: &str,
    ) -> Result<String, ProviderError>;
}

/// Trims the reply and turns an empty one into an error.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, ProviderError> {
    text.map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(ProviderError::EmptyResponse)
}

/// Reads a failed response into a status error.
pub(crate) async fn status_error(resp: reqwest::Response, model: &str) -> ProviderError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    ProviderError::from_status(status, model, body)
}
