use crate::chunk::Chunk;

/// Blank line between paragraphs.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Upper bound for a chunk, in characters.
    pub max_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self { max_chars: 120_000 }
    }
}

pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    pub fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    pub fn max_chars(&self) -> usize {
        self.config.max_chars
    }

    /// Split text into chunks along paragraph breaks.
    ///
    /// Text that already fits comes back as a single chunk equal to the
    /// input. Longer text is packed greedily, whole paragraphs at a time,
    /// each followed by a paragraph separator. A paragraph that is larger
    /// than the bound on its own becomes one oversized chunk; it is never
    /// split mid-paragraph.
    pub fn chunk_text(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        if text.chars().count() <= self.config.max_chars {
            return vec![Chunk::new(0, text.to_string(), (0, text.len()))];
        }

        let separator_chars = PARAGRAPH_SEPARATOR.chars().count();
        let mut chunks = Vec::new();
        let mut buffer = String::new();
        let mut buffer_chars = 0;
        let mut buffer_start = 0;
        // Byte position in `text`, used for offsets
        let mut cursor = 0;

        for para in text.split(PARAGRAPH_SEPARATOR) {
            let para_chars = para.chars().count();

            // Flush before the bound would be reached
            if !buffer.is_empty() && buffer_chars + para_chars >= self.config.max_chars {
                let end = cursor.min(text.len());
                chunks.push(Chunk::new(
                    chunks.len(),
                    std::mem::take(&mut buffer),
                    (buffer_start, end),
                ));
                buffer_chars = 0;
                buffer_start = cursor;
            }

            buffer.push_str(para);
            buffer.push_str(PARAGRAPH_SEPARATOR);
            buffer_chars += para_chars + separator_chars;
            cursor += para.len() + PARAGRAPH_SEPARATOR.len();
        }

        if !buffer.is_empty() {
            chunks.push(Chunk::new(
                chunks.len(),
                buffer,
                (buffer_start, cursor.min(text.len())),
            ));
        }

        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chunker(max_chars: usize) -> Chunker {
        Chunker::new(ChunkerConfig { max_chars })
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let chunker = Chunker::default();
        let text = "This is a test paragraph.\n\nThis is another paragraph.";
        let chunks = chunker.chunk_text(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].offset, (0, text.len()));
    }

    #[test]
    fn test_text_at_bound_is_single_chunk() {
        let text = "a".repeat(40);
        let chunks = small_chunker(40).chunk_text(&text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(Chunker::default().chunk_text("").is_empty());
    }

    #[test]
    fn test_greedy_paragraph_packing() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(10), "b".repeat(10), "c".repeat(10));
        let chunks = small_chunker(25).chunk_text(&text);

        // "aaaaaaaaaa\n\n" is 12 characters; adding 10 more stays under 25
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n\n{}\n\n", "a".repeat(10), "b".repeat(10)));
        assert_eq!(chunks[1].text, format!("{}\n\n", "c".repeat(10)));
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_concatenation_reconstructs_input() {
        let paragraphs: Vec<String> = (0..50)
            .map(|i| format!("Paragraph {} with PAN AAUFM{:04}N.", i, i))
            .collect();
        let text = paragraphs.join("\n\n");
        let chunks = small_chunker(200).chunk_text(&text);

        assert!(chunks.len() > 1);
        let joined: String = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(joined, format!("{}\n\n", text));
    }

    #[test]
    fn test_offsets_point_into_source() {
        let text = format!("{}\n\n{}\n\n{}", "a".repeat(10), "b".repeat(10), "c".repeat(10));
        let chunks = small_chunker(25).chunk_text(&text);

        for chunk in &chunks {
            let (start, end) = chunk.offset;
            assert_eq!(
                text[start..end].trim_end_matches('\n'),
                chunk.text.trim_end_matches('\n')
            );
        }
    }

    #[test]
    fn test_bound_counts_characters_not_bytes() {
        // 62 characters, 182 bytes
        let text = format!("{}\n\n{}", "अ".repeat(30), "ब".repeat(30));
        let chunks = small_chunker(100).chunk_text(&text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].offset, (0, text.len()));
    }

    #[test]
    fn test_non_ascii_packing_keeps_byte_offsets() {
        let text = format!("{}\n\n{}\n\n{}", "अ".repeat(10), "ब".repeat(10), "क".repeat(10));
        let chunks = small_chunker(25).chunk_text(&text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, format!("{}\n\n{}\n\n", "अ".repeat(10), "ब".repeat(10)));
        assert_eq!(chunks[1].text, format!("{}\n\n", "क".repeat(10)));
        for chunk in &chunks {
            let (start, end) = chunk.offset;
            assert_eq!(
                text[start..end].trim_end_matches('\n'),
                chunk.text.trim_end_matches('\n')
            );
        }
    }

    #[test]
    fn test_oversized_paragraph_is_kept_whole() {
        let big = "x".repeat(100);
        let text = format!("short\n\n{}\n\ntail", big);
        let chunks = small_chunker(30).chunk_text(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, format!("{}\n\n", big));
        assert!(chunks[1].len() > 30);
    }
}
