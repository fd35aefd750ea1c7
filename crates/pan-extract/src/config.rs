use anyhow::{Context, Result};
use extract::{DEFAULT_PREFERENCES, GenerationConfig, RetryPolicy};
use ingest::ChunkerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PipelineError;

pub const API_KEY_VAR: &str = "GOOGLE_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub chunking: ChunkingConfig,
    pub retry: RetryConfig,
    pub pacing: PacingConfig,
    pub models: ModelConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub parse_backoff_ms: u64,
    pub rate_limit_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub inter_chunk_delay_ms: u64,
    pub model_switch_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub preferences: Vec<String>,
    /// Stop at a model whose every chunk parsed cleanly to an empty list,
    /// instead of falling back to the next model.
    pub accept_confirmed_empty: bool,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("toext.pdf"),
            output: PathBuf::from("result.csv"),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_chars: 120_000 }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            parse_backoff_ms: 1_000,
            rate_limit_backoff_ms: 16_000,
            max_backoff_ms: 300_000,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_chunk_delay_ms: 5_000,
            model_switch_delay_ms: 2_000,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_base_url: extract::llm::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 300,
            preferences: DEFAULT_PREFERENCES.iter().map(|p| p.to_string()).collect(),
            accept_confirmed_empty: false,
        }
    }
}

impl AppConfig {
    /// Load from a TOML file, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn chunker_config(&self) -> ChunkerConfig {
        ChunkerConfig {
            max_chars: self.chunking.max_chars,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry.max_attempts,
            self.retry.parse_backoff_ms,
            self.retry.rate_limit_backoff_ms,
            self.retry.max_backoff_ms,
        )
    }

    pub fn inter_chunk_delay(&self) -> Duration {
        Duration::from_millis(self.pacing.inter_chunk_delay_ms)
    }

    pub fn model_switch_delay(&self) -> Duration {
        Duration::from_millis(self.pacing.model_switch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.models.request_timeout_secs)
    }
}

/// Read the API key after `.env` has been loaded into the environment.
/// Load variables from a `.env` file. A missing file is not an error.
pub fn load_env_file(path: &Path) -> Result<(), dotenvy::Error> {
    match dotenvy::from_path(path) {
        Err(e) if e.not_found() => Ok(()),
        other => other,
    }
}

pub fn api_key_from_env() -> Result<String, PipelineError> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(PipelineError::MissingApiKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.paths.input, PathBuf::from("toext.pdf"));
        assert_eq!(config.paths.output, PathBuf::from("result.csv"));
        assert_eq!(config.chunking.max_chars, 120_000);
        assert_eq!(config.inter_chunk_delay(), Duration::from_secs(5));
        assert_eq!(config.generation.temperature, 0.1);
        assert_eq!(config.models.preferences[0], "gemini-2.0-flash");
        assert!(!config.models.accept_confirmed_empty);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [paths]
            input = "orders/sebi.pdf"

            [pacing]
            inter_chunk_delay_ms = 0

            [models]
            preferences = ["gemini-2.5-pro"]
            "#,
        )
        .unwrap();

        assert_eq!(config.paths.input, PathBuf::from("orders/sebi.pdf"));
        assert_eq!(config.paths.output, PathBuf::from("result.csv"));
        assert_eq!(config.pacing.inter_chunk_delay_ms, 0);
        assert_eq!(config.pacing.model_switch_delay_ms, 2_000);
        assert_eq!(config.models.preferences, vec!["gemini-2.5-pro".to_string()]);
        assert_eq!(config.retry.max_attempts, 3);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        assert!(AppConfig::load(Some(Path::new("no/such/config.toml"))).is_err());
        assert!(AppConfig::load(None).is_ok());
    }

    #[test]
    fn test_unknown_types_rejected() {
        assert!(AppConfig::from_toml("[chunking]\nmax_chars = \"big\"").is_err());
    }

    #[test]
    fn test_missing_env_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_file(&dir.path().join(".env")).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "this is not a dotenv line\n").unwrap();

        let err = load_env_file(&path).unwrap_err();
        assert!(!err.not_found());
    }
}
