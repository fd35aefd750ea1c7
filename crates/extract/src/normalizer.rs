use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::schema::{ExtractedRecord, PAN_RELATION, RawRecord};

/// Turns loosely-shaped model output into validated records.
pub struct RecordNormalizer {
    pan_format: Regex,
}

impl RecordNormalizer {
    pub fn new() -> Self {
        Self {
            pan_format: Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern is valid"),
        }
    }

    /// Keep only elements carrying both a PAN and an entity name.
    pub fn normalize(&self, values: Vec<Value>) -> Vec<ExtractedRecord> {
        values
            .into_iter()
            .filter_map(|value| self.normalize_one(value))
            .collect()
    }

    fn normalize_one(&self, value: Value) -> Option<ExtractedRecord> {
        let raw: RawRecord = serde_json::from_value(value).ok()?;

        let pan = raw.pan?.trim().to_uppercase();
        let entity = raw.entity?.trim().to_string();

        if pan.is_empty() || entity.is_empty() {
            return None;
        }

        if let Some(relation) = raw.relation.as_deref() {
            if relation != PAN_RELATION {
                debug!(relation, "Replacing unexpected relation");
            }
        }

        if !self.is_well_formed_pan(&pan) {
            debug!(pan = %pan, "PAN does not match the expected format");
        }

        Some(ExtractedRecord::new(pan, entity))
    }

    fn is_well_formed_pan(&self, pan: &str) -> bool {
        self.pan_format.is_match(pan)
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
