use serde::{Deserialize, Serialize};

/// The only relation this extractor emits.
pub const PAN_RELATION: &str = "PAN_Of";

/// A PAN number tied to the person or organisation it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pan: String,
    relation: String,
    entity: String,
}

impl ExtractedRecord {
    pub fn new(pan: impl Into<String>, entity: impl Into<String>) -> Self {
        Self {
            pan: pan.into(),
            relation: PAN_RELATION.to_string(),
            entity: entity.into(),
        }
    }

    pub fn pan(&self) -> &str {
        &self.pan
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }
}

/// One element of the model's JSON array, before validation.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawRecord {
    #[serde(default)]
    pub pan: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
}
