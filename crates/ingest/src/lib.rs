pub mod chunk;
pub mod chunker;
pub mod reader;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig, PARAGRAPH_SEPARATOR};
pub use reader::{ExtractedText, PdfReader, ReadError};

use std::path::Path;

/// Read a PDF and split its text into request-sized chunks
pub async fn ingest_pdf(path: &Path, config: ChunkerConfig) -> Result<Vec<Chunk>, ReadError> {
    let extracted = PdfReader::read_pdf(path).await?;
    let chunker = Chunker::new(config);
    Ok(chunker.chunk_text(&extracted.text))
}
