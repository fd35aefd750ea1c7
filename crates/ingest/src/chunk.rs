use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
    pub offset: (usize, usize), // [start, end) byte positions in the source text
}

impl Chunk {
    pub fn new(index: usize, text: String, offset: (usize, usize)) -> Self {
        Self {
            index,
            text,
            offset,
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Estimate token count (rough: 1.3 tokens per word)
    pub fn estimated_tokens(&self) -> usize {
        let word_count = self.text.split_whitespace().count();
        (word_count as f64 * 1.3) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimated_tokens() {
        let chunk = Chunk::new(0, "ten words of text here to count the tokens ok".to_string(), (0, 45));
        assert_eq!(chunk.estimated_tokens(), 13);
        assert_eq!(chunk.len(), 45);
    }
}
