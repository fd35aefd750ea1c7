use std::time::{Duration, Instant};

pub struct RunMetrics {
    started: Instant,

    // Counts
    chunks_total: usize,
    chunks_processed: usize,
    models_tried: usize,
    records_extracted: usize,

    // Timing
    extract_time: Duration,
}

impl RunMetrics {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            chunks_total: 0,
            chunks_processed: 0,
            models_tried: 0,
            records_extracted: 0,
            extract_time: Duration::ZERO,
        }
    }

    pub fn record_chunking(&mut self, chunks: usize) {
        self.chunks_total = chunks;
    }

    pub fn record_model(&mut self) {
        self.models_tried += 1;
    }

    pub fn record_chunk(&mut self, records: usize) {
        self.chunks_processed += 1;
        self.records_extracted += records;
    }

    pub fn record_extract(&mut self, duration: Duration) {
        self.extract_time += duration;
    }

    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            elapsed: self.started.elapsed(),
            extract_time: self.extract_time,
            chunks_total: self.chunks_total,
            chunks_processed: self.chunks_processed,
            models_tried: self.models_tried,
            records_extracted: self.records_extracted,
        }
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::start()
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub elapsed: Duration,
    pub extract_time: Duration,
    pub chunks_total: usize,
    /// Chunk requests across every model tried.
    pub chunks_processed: usize,
    pub models_tried: usize,
    /// Records seen across every model tried, including discarded ones.
    pub records_extracted: usize,
}
