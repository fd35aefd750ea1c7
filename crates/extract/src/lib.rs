pub mod error;
pub mod llm;
pub mod normalizer;
pub mod parser;
pub mod prompt;
pub mod provider;
pub mod retry;
pub mod schema;
pub mod selector;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::ChunkError;
pub use llm::GeminiClient;
pub use normalizer::RecordNormalizer;
pub use provider::{FinishReason, Generation, GenerationConfig, ModelInfo, Provider};
pub use retry::{Delay, RetryPolicy, TokioDelay};
pub use schema::{ExtractedRecord, PAN_RELATION};
pub use selector::{DEFAULT_PREFERENCES, ModelCandidate, ModelSelector};

use std::sync::Arc;
use tracing::{info, warn};

/// Result of running one chunk through a model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// The model answered with parseable output; the list may be empty.
    Extracted(Vec<ExtractedRecord>),
    /// The chunk produced nothing usable and was skipped.
    Skipped(SkipReason),
    /// Rate-limit retries ran out; the model should be abandoned.
    QuotaExhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Truncated,
    SafetyFiltered,
    Stopped(String),
    Unparseable,
    RequestFailed(String),
}

impl ChunkOutcome {
    pub fn records(&self) -> &[ExtractedRecord] {
        match self {
            Self::Extracted(records) => records,
            _ => &[],
        }
    }
}

pub struct Extractor {
    provider: Arc<dyn Provider>,
    retry: RetryPolicy,
    generation: GenerationConfig,
    normalizer: RecordNormalizer,
}

impl Extractor {
    pub fn new(provider: Arc<dyn Provider>, retry: RetryPolicy, generation: GenerationConfig) -> Self {
        Self {
            provider,
            retry,
            generation,
            normalizer: RecordNormalizer::new(),
        }
    }

    /// Extract PAN records from one chunk of text with the given model.
    ///
    /// Per-chunk failures never escape: they are logged and reported as
    /// a skip. Only rate-limit exhaustion is reported distinctly so the
    /// caller can move on to another model.
    pub async fn extract_chunk(
        &self,
        model: &str,
        text: &str,
        chunk_num: usize,
        total_chunks: usize,
        delay: &dyn Delay,
    ) -> ChunkOutcome {
        info!(chunk = chunk_num, total = total_chunks, model, "Processing chunk");

        let prompt = prompt::build_extraction_prompt();
        let result = self
            .retry
            .retry("extract_chunk", delay, || self.attempt(model, prompt, text))
            .await;

        match result {
            Ok(records) => {
                info!(chunk = chunk_num, found = records.len(), "Extracted records from chunk");
                ChunkOutcome::Extracted(records)
            }
            Err(ChunkError::RateLimited(_)) => {
                warn!(chunk = chunk_num, model, "Max retries reached on rate limit");
                ChunkOutcome::QuotaExhausted
            }
            Err(ChunkError::TruncatedOutput) => {
                warn!(chunk = chunk_num, "Output truncated; chunk may be too large for this model");
                ChunkOutcome::Skipped(SkipReason::Truncated)
            }
            Err(ChunkError::SafetyFiltered) => {
                warn!(chunk = chunk_num, "Content filtered for safety");
                ChunkOutcome::Skipped(SkipReason::SafetyFiltered)
            }
            Err(ChunkError::UnexpectedStop(reason)) => {
                warn!(chunk = chunk_num, finish_reason = %reason, "Generation stopped early");
                ChunkOutcome::Skipped(SkipReason::Stopped(reason))
            }
            Err(ChunkError::ChunkParseFailure(e)) => {
                warn!(chunk = chunk_num, error = %e, "Giving up on unparseable output");
                ChunkOutcome::Skipped(SkipReason::Unparseable)
            }
            Err(ChunkError::Request(e)) => {
                warn!(chunk = chunk_num, error = %e, "Error processing chunk");
                ChunkOutcome::Skipped(SkipReason::RequestFailed(e))
            }
        }
    }

    async fn attempt(
        &self,
        model: &str,
        prompt: &str,
        text: &str,
    ) -> Result<Vec<ExtractedRecord>, ChunkError> {
        let generation = self
            .provider
            .generate(model, &[prompt, text], &self.generation)
            .await
            .map_err(|e| ChunkError::from_provider(&e))?;

        match generation.finish_reason {
            FinishReason::Stop => {}
            FinishReason::MaxTokens => return Err(ChunkError::TruncatedOutput),
            FinishReason::Safety => return Err(ChunkError::SafetyFiltered),
            FinishReason::Other(reason) => return Err(ChunkError::UnexpectedStop(reason)),
        }

        let values = parser::parse_response(&generation.text)
            .map_err(|e| ChunkError::ChunkParseFailure(e.to_string()))?;

        Ok(self.normalizer.normalize(values))
    }
}
