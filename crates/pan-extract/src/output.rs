use extract::ExtractedRecord;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::PipelineError;

pub const CSV_HEADER: [&str; 3] = ["Entity (PAN)", "Relation", "Entity (Person)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteSummary {
    /// Nothing to write; no file was created.
    Skipped,
    Written(usize),
}

pub struct CsvWriter {
    path: PathBuf,
}

impl CsvWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write a header and one row per record.
    pub fn write(&self, records: &[ExtractedRecord]) -> Result<WriteSummary, PipelineError> {
        if records.is_empty() {
            info!("No data to write to CSV");
            return Ok(WriteSummary::Skipped);
        }

        info!(records = records.len(), path = %self.path.display(), "Writing records to CSV");
        self.write_rows(records).map_err(|source| PipelineError::WriteFailure {
            path: self.path.clone(),
            source,
        })?;

        Ok(WriteSummary::Written(records.len()))
    }

    fn write_rows(&self, records: &[ExtractedRecord]) -> Result<(), csv::Error> {
        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADER)?;
        for record in records {
            writer.write_record([record.pan(), record.relation(), record.entity()])?;
        }
        writer.flush()?;
        Ok(())
    }
}
