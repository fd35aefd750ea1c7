use thiserror::Error;

/// Failure of a single extraction attempt.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("model output is not valid JSON: {0}")]
    ChunkParseFailure(String),

    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("response was filtered for safety")]
    SafetyFiltered,

    #[error("response was truncated at the output token limit")]
    TruncatedOutput,

    #[error("generation stopped early: {0}")]
    UnexpectedStop(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl ChunkError {
    /// Classify a provider error by its rendered text.
    pub fn from_provider(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        if is_rate_limit(&message) {
            Self::RateLimited(message)
        } else {
            Self::Request(message)
        }
    }
}

pub fn is_rate_limit(message: &str) -> bool {
    message.contains("429") || message.to_lowercase().contains("quota")
}
