use ingest::ReadError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("GOOGLE_API_KEY not found in the environment or .env file")]
    MissingApiKey,

    #[error(transparent)]
    Input(#[from] ReadError),

    #[error("no available models found; check the API key")]
    CatalogUnavailable,

    #[error("all {tried} models exhausted without extracting any records")]
    AllModelsExhausted { tried: usize },

    #[error("failed to write CSV file '{}': {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
