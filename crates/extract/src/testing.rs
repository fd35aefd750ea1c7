//! Deterministic stand-ins for the provider and the clock.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::provider::{Generation, GenerationConfig, ModelInfo, Provider};
use crate::retry::Delay;

/// Records requested waits instead of sleeping.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Delay for RecordingDelay {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// A generate request as the provider received it.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub model: String,
    pub parts: Vec<String>,
    pub config: GenerationConfig,
}

/// Provider that replays scripted responses per model.
///
/// Once a model's script runs out, further requests fail with a
/// non-retryable error.
pub struct FakeProvider {
    catalog: Result<Vec<ModelInfo>, String>,
    scripts: Mutex<HashMap<String, VecDeque<Result<Generation, String>>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl FakeProvider {
    pub fn new(catalog: Vec<ModelInfo>) -> Self {
        Self {
            catalog: Ok(catalog),
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Catalog of generate-capable models with the given names.
    pub fn with_models(names: &[&str]) -> Self {
        Self::new(
            names
                .iter()
                .map(|name| ModelInfo::new(*name, &["generateContent"]))
                .collect(),
        )
    }

    pub fn failing_catalog(message: &str) -> Self {
        Self {
            catalog: Err(message.to_string()),
            scripts: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(self, model: &str, generation: Generation) -> Self {
        self.push(model, Ok(generation))
    }

    pub fn respond_text(self, model: &str, text: &str) -> Self {
        self.respond(model, Generation::completed(text))
    }

    pub fn fail(self, model: &str, message: &str) -> Self {
        self.push(model, Err(message.to_string()))
    }

    fn push(self, model: &str, response: Result<Generation, String>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(response);
        self
    }

    /// Model names in the order generate requests arrived.
    pub fn calls(&self) -> Vec<String> {
        self.requests().into_iter().map(|request| request.model).collect()
    }

    /// Every generate request in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for FakeProvider {
    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        self.catalog.clone().map_err(anyhow::Error::msg)
    }

    async fn generate(
        &self,
        model: &str,
        parts: &[&str],
        config: &GenerationConfig,
    ) -> Result<Generation> {
        self.requests.lock().unwrap().push(RecordedRequest {
            model: model.to_string(),
            parts: parts.iter().map(|part| part.to_string()).collect(),
            config: config.clone(),
        });
        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(model)
            .and_then(|script| script.pop_front());

        match next {
            Some(Ok(generation)) => Ok(generation),
            Some(Err(message)) => Err(anyhow::Error::msg(message)),
            None => anyhow::bail!("no scripted response left for {}", model),
        }
    }
}
