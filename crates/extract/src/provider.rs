use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Catalog capability required for extraction requests.
pub const GENERATE_CONTENT: &str = "generateContent";

/// One entry of the provider's model catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

impl ModelInfo {
    pub fn new(name: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            name: name.into(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }
}

/// Why generation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other(String),
}

impl FinishReason {
    pub fn from_api(reason: &str) -> Self {
        match reason {
            "STOP" => Self::Stop,
            "MAX_TOKENS" => Self::MaxTokens,
            "SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => Self::Safety,
            other => Self::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: FinishReason,
}

impl Generation {
    pub fn completed(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            finish_reason: FinishReason::Stop,
        }
    }

    pub fn stopped(finish_reason: FinishReason) -> Self {
        Self {
            text: String::new(),
            finish_reason,
        }
    }
}

/// Decoding parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// A generative model backend.
///
/// Errors are plain `anyhow` errors; callers classify them by their
/// rendered text, so implementations should keep HTTP status codes and
/// provider messages in the error chain.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;

    async fn generate(
        &self,
        model: &str,
        parts: &[&str],
        config: &GenerationConfig,
    ) -> Result<Generation>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_reason_mapping() {
        assert_eq!(FinishReason::from_api("STOP"), FinishReason::Stop);
        assert_eq!(FinishReason::from_api("MAX_TOKENS"), FinishReason::MaxTokens);
        assert_eq!(FinishReason::from_api("SAFETY"), FinishReason::Safety);
        assert_eq!(
            FinishReason::from_api("RECITATION"),
            FinishReason::Other("RECITATION".to_string())
        );
    }

    #[test]
    fn test_model_supports() {
        let model = ModelInfo::new("models/embedding-001", &["embedContent"]);
        assert!(!model.supports(GENERATE_CONTENT));
        assert!(model.supports("embedContent"));
    }
}
