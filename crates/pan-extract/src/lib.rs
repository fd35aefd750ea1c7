pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod output;

pub use config::{AppConfig, api_key_from_env, load_env_file};
pub use error::PipelineError;
pub use metrics::{MetricsSummary, RunMetrics};
pub use orchestrator::{Extraction, Orchestrator, RunReport, RunState};
pub use output::{CSV_HEADER, CsvWriter, WriteSummary};
