use tracing::{info, warn};

use crate::provider::{GENERATE_CONTENT, ModelInfo, Provider};

/// Quota-friendly models first: flash models carry higher free-tier limits.
pub const DEFAULT_PREFERENCES: &[&str] = &[
    "gemini-2.0-flash",
    "gemini-2.5-flash",
    "gemini-flash-latest",
    "gemini-2.0-flash-lite",
    "gemini-2.5-flash-lite",
    "gemini-2.5-pro",
    "gemini-pro-latest",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidate {
    pub name: String,
    pub preference_rank: usize,
}

pub struct ModelSelector {
    preferences: Vec<String>,
}

impl ModelSelector {
    pub fn new(preferences: Vec<String>) -> Self {
        Self { preferences }
    }

    /// Query the catalog and order its generate-capable models.
    ///
    /// A failed catalog query is logged and yields no candidates.
    pub async fn select(&self, provider: &dyn Provider) -> Vec<ModelCandidate> {
        match provider.list_models().await {
            Ok(models) => {
                let candidates = self.order(&models);
                info!(
                    listed = models.len(),
                    usable = candidates.len(),
                    "Ordered available models"
                );
                candidates
            }
            Err(e) => {
                warn!(error = %format!("{:#}", e), "Error listing models");
                Vec::new()
            }
        }
    }

    /// Keep models supporting content generation, preferred substrings
    /// first, everything else after in catalog order.
    pub fn order(&self, models: &[ModelInfo]) -> Vec<ModelCandidate> {
        let available: Vec<&ModelInfo> = models
            .iter()
            .filter(|m| m.supports(GENERATE_CONTENT))
            .collect();

        let mut taken = vec![false; available.len()];
        let mut ordered = Vec::with_capacity(available.len());

        for (rank, preferred) in self.preferences.iter().enumerate() {
            for (i, model) in available.iter().enumerate() {
                if !taken[i] && model.name.contains(preferred.as_str()) {
                    taken[i] = true;
                    ordered.push(ModelCandidate {
                        name: model.name.clone(),
                        preference_rank: rank,
                    });
                }
            }
        }

        let unranked = self.preferences.len();
        for (i, model) in available.iter().enumerate() {
            if !taken[i] {
                ordered.push(ModelCandidate {
                    name: model.name.clone(),
                    preference_rank: unranked,
                });
            }
        }

        ordered
    }
}

impl Default for ModelSelector {
    fn default() -> Self {
        Self::new(DEFAULT_PREFERENCES.iter().map(|p| p.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    fn names(candidates: &[ModelCandidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_filters_and_orders_by_preference() {
        let catalog = vec![
            ModelInfo::new("models/gemini-2.5-pro", &["generateContent", "countTokens"]),
            ModelInfo::new("models/text-embedding-004", &["embedContent"]),
            ModelInfo::new("models/gemma-3-27b-it", &["generateContent"]),
            ModelInfo::new("models/gemini-2.5-flash", &["generateContent"]),
            ModelInfo::new("models/gemini-2.0-flash", &["generateContent"]),
            ModelInfo::new("models/aqa", &["generateAnswer"]),
        ];

        let ordered = ModelSelector::default().order(&catalog);
        assert_eq!(
            names(&ordered),
            vec![
                "models/gemini-2.0-flash",
                "models/gemini-2.5-flash",
                "models/gemini-2.5-pro",
                "models/gemma-3-27b-it",
            ]
        );
        assert_eq!(ordered[0].preference_rank, 0);
        assert_eq!(ordered[3].preference_rank, DEFAULT_PREFERENCES.len());
    }

    #[test]
    fn test_substring_ties_keep_catalog_order() {
        let catalog = vec![
            ModelInfo::new("models/gemini-2.0-flash-lite", &["generateContent"]),
            ModelInfo::new("models/gemini-2.0-flash-001", &["generateContent"]),
            ModelInfo::new("models/other-b", &["generateContent"]),
            ModelInfo::new("models/other-a", &["generateContent"]),
        ];

        let ordered = ModelSelector::default().order(&catalog);
        assert_eq!(
            names(&ordered),
            vec![
                "models/gemini-2.0-flash-lite",
                "models/gemini-2.0-flash-001",
                "models/other-b",
                "models/other-a",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_catalog_yields_nothing() {
        let provider = FakeProvider::failing_catalog("403 API key not valid");
        assert!(ModelSelector::default().select(&provider).await.is_empty());
    }

    #[tokio::test]
    async fn test_select_uses_catalog() {
        let provider = FakeProvider::with_models(&["models/gemma-3", "models/gemini-2.5-flash"]);
        let ordered = ModelSelector::default().select(&provider).await;
        assert_eq!(names(&ordered), vec!["models/gemini-2.5-flash", "models/gemma-3"]);
    }
}
