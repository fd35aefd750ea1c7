use extract::{ChunkOutcome, Delay, ExtractedRecord, Extractor, ModelCandidate, ModelSelector, Provider};
use ingest::{Chunk, Chunker};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::metrics::{MetricsSummary, RunMetrics};
use crate::output::{CsvWriter, WriteSummary};

/// How many candidates to list when a run starts.
const CANDIDATES_SHOWN: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    SelectingModel,
    ProcessingChunks,
    Done,
    ModelExhausted,
    AllModelsExhausted,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SelectingModel => "selecting-model",
            Self::ProcessingChunks => "processing-chunks",
            Self::Done => "done",
            Self::ModelExhausted => "model-exhausted",
            Self::AllModelsExhausted => "all-models-exhausted",
        };
        f.write_str(name)
    }
}

/// Records accepted for the run and the model that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub model: Option<String>,
    pub records: Vec<ExtractedRecord>,
    /// The model hit its quota before every chunk was processed.
    pub partial: bool,
}

#[derive(Debug)]
pub struct RunReport {
    pub extraction: Extraction,
    pub output: WriteSummary,
    pub output_path: PathBuf,
    pub metrics: MetricsSummary,
}

enum ModelAttempt {
    Records(Vec<ExtractedRecord>),
    Empty { confirmed: bool },
    QuotaExhausted { partial: Vec<ExtractedRecord> },
}

pub struct Orchestrator {
    config: AppConfig,
    provider: Arc<dyn Provider>,
    delay: Arc<dyn Delay>,
    selector: ModelSelector,
    extractor: Extractor,
    chunker: Chunker,
}

impl Orchestrator {
    pub fn new(config: AppConfig, provider: Arc<dyn Provider>, delay: Arc<dyn Delay>) -> Self {
        let extractor = Extractor::new(
            provider.clone(),
            config.retry_policy(),
            config.generation.clone(),
        );
        let selector = ModelSelector::new(config.models.preferences.clone());
        let chunker = Chunker::new(config.chunker_config());

        Self {
            config,
            provider,
            delay,
            selector,
            extractor,
            chunker,
        }
    }

    /// Read the input PDF, extract records and write them to CSV.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut metrics = RunMetrics::start();

        let chunks = ingest::ingest_pdf(&self.config.paths.input, self.config.chunker_config()).await?;
        let extraction = self.extract_chunks(&chunks, &mut metrics).await?;

        if extraction.records.is_empty() {
            info!("No PAN-entity pairs found in the document");
        }

        let writer = CsvWriter::new(&self.config.paths.output);
        let output = writer.write(&extraction.records)?;

        Ok(RunReport {
            extraction,
            output,
            output_path: writer.path().to_path_buf(),
            metrics: metrics.summary(),
        })
    }

    /// Extract records from already-read document text.
    pub async fn extract(&self, text: &str, metrics: &mut RunMetrics) -> Result<Extraction, PipelineError> {
        let chunks = self.chunker.chunk_text(text);
        self.extract_chunks(&chunks, metrics).await
    }

    async fn extract_chunks(
        &self,
        chunks: &[Chunk],
        metrics: &mut RunMetrics,
    ) -> Result<Extraction, PipelineError> {
        metrics.record_chunking(chunks.len());

        if chunks.is_empty() {
            warn!("Document has no text to send");
            return Ok(Extraction {
                model: None,
                records: Vec::new(),
                partial: false,
            });
        }

        if chunks.len() > 1 {
            info!(
                chunks = chunks.len(),
                max_chars = self.chunker.max_chars(),
                "Document is large; processing in chunks"
            );
        } else {
            info!("Processing document in a single request");
        }

        self.enter(RunState::SelectingModel, None);
        let candidates = self.selector.select(self.provider.as_ref()).await;
        if candidates.is_empty() {
            error!("No available models found");
            return Err(PipelineError::CatalogUnavailable);
        }

        info!(count = candidates.len(), "Available models");
        for (i, candidate) in candidates.iter().take(CANDIDATES_SHOWN).enumerate() {
            info!(order = i + 1, model = %candidate.name, "Will try model");
        }

        let started = Instant::now();
        let result = self.try_models(&candidates, chunks, metrics).await;
        metrics.record_extract(started.elapsed());
        result
    }

    async fn try_models(
        &self,
        candidates: &[ModelCandidate],
        chunks: &[Chunk],
        metrics: &mut RunMetrics,
    ) -> Result<Extraction, PipelineError> {
        for (index, candidate) in candidates.iter().enumerate() {
            let has_next = index + 1 < candidates.len();
            let model = candidate.name.as_str();

            metrics.record_model();
            self.enter(RunState::ProcessingChunks, Some(model));

            match self.process_model(candidate, chunks, metrics).await {
                ModelAttempt::Records(records) => {
                    self.enter(RunState::Done, Some(model));
                    info!(model, records = records.len(), "Total records extracted");
                    return Ok(Extraction {
                        model: Some(candidate.name.clone()),
                        records,
                        partial: false,
                    });
                }
                ModelAttempt::Empty { confirmed: true } if self.config.models.accept_confirmed_empty => {
                    self.enter(RunState::Done, Some(model));
                    info!(model, "Model found no PAN-entity pairs");
                    return Ok(Extraction {
                        model: Some(candidate.name.clone()),
                        records: Vec::new(),
                        partial: false,
                    });
                }
                ModelAttempt::Empty { confirmed } => {
                    if has_next {
                        self.enter(RunState::ModelExhausted, Some(model));
                        warn!(model, confirmed, "No entities found; trying next model");
                    }
                }
                ModelAttempt::QuotaExhausted { partial } => {
                    if has_next {
                        self.enter(RunState::ModelExhausted, Some(model));
                        warn!(
                            model,
                            discarded = partial.len(),
                            "Rate limit exceeded; trying next model"
                        );
                        self.delay.sleep(self.config.model_switch_delay()).await;
                    } else if !partial.is_empty() {
                        self.enter(RunState::Done, Some(model));
                        warn!(model, records = partial.len(), "Rate limit exceeded; keeping partial results");
                        return Ok(Extraction {
                            model: Some(candidate.name.clone()),
                            records: partial,
                            partial: true,
                        });
                    }
                }
            }
        }

        self.enter(RunState::AllModelsExhausted, None);
        error!("All models exhausted; please wait and try again later");
        Err(PipelineError::AllModelsExhausted {
            tried: candidates.len(),
        })
    }

    async fn process_model(
        &self,
        candidate: &ModelCandidate,
        chunks: &[Chunk],
        metrics: &mut RunMetrics,
    ) -> ModelAttempt {
        let total = chunks.len();
        let mut records = Vec::new();
        let mut confirmed = true;

        for chunk in chunks {
            let chunk_num = chunk.index + 1;
            debug!(
                chunk = chunk_num,
                chars = chunk.len(),
                estimated_tokens = chunk.estimated_tokens(),
                "Sending chunk"
            );

            let outcome = self
                .extractor
                .extract_chunk(&candidate.name, &chunk.text, chunk_num, total, self.delay.as_ref())
                .await;
            metrics.record_chunk(outcome.records().len());

            match outcome {
                ChunkOutcome::Extracted(found) => records.extend(found),
                ChunkOutcome::Skipped(_) => confirmed = false,
                ChunkOutcome::QuotaExhausted => return ModelAttempt::QuotaExhausted { partial: records },
            }

            if chunk_num < total {
                let delay = self.config.inter_chunk_delay();
                debug!(delay_ms = delay.as_millis() as u64, "Waiting before next chunk");
                self.delay.sleep(delay).await;
            }
        }

        if records.is_empty() {
            ModelAttempt::Empty { confirmed }
        } else {
            ModelAttempt::Records(records)
        }
    }

    fn enter(&self, state: RunState, model: Option<&str>) {
        match model {
            Some(model) => info!(state = %state, model, "Run state"),
            None => info!(state = %state, "Run state"),
        }
    }
}
