use crate::error::IngestError;
use crate::models::IngestionOptions;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self::from(&IngestionOptions::default())
    }
}

impl From<&IngestionOptions> for ChunkingConfig {
    fn from(value: &IngestionOptions) -> Self {
        Self {
            chunk_size: value.chunk_size,
            chunk_overlap: value.chunk_overlap,
            separator: value.separator.clone(),
        }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.chunk_size == 0 {
            return Err(IngestError::InvalidChunkConfig(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(IngestError::InvalidChunkConfig(format!(
                "chunk_overlap {} is larger than chunk_size {}",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.separator.is_empty() {
            return Err(IngestError::InvalidChunkConfig(
                "separator must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Splits `text` on the configured separator and merges the pieces into
/// overlapping chunks of at most `chunk_size` characters.
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>, IngestError> {
    config.validate()?;

    let pieces = text
        .split(config.separator.as_str())
        .filter(|piece| !piece.is_empty())
        .flat_map(|piece| window_oversized(piece, config))
        .collect::<Vec<_>>();

    Ok(merge_pieces(&pieces, config))
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn window_oversized(piece: &str, config: &ChunkingConfig) -> Vec<String> {
    if char_len(piece) <= config.chunk_size {
        return vec![piece.to_string()];
    }

    let chars: Vec<char> = piece.chars().collect();
    let step = config.chunk_size.saturating_sub(config.chunk_overlap).max(1);
    let mut windows = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + config.chunk_size).min(chars.len());
        windows.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start = start.saturating_add(step);
    }
    windows
}

fn merge_pieces(pieces: &[String], config: &ChunkingConfig) -> Vec<String> {
    let separator_len = char_len(&config.separator);
    let joiner = |count: usize| if count == 0 { 0 } else { separator_len };

    let mut chunks = Vec::new();
    let mut current: VecDeque<&str> = VecDeque::new();
    let mut total = 0usize;

    for piece in pieces {
        let len = char_len(piece);

        if total + len + joiner(current.len()) > config.chunk_size && !current.is_empty() {
            push_joined(&mut chunks, &current, &config.separator);

            // Keep a tail of the emitted chunk as overlap, as long as the next
            // piece still fits after it.
            while total > config.chunk_overlap
                || (total > 0 && total + len + joiner(current.len()) > config.chunk_size)
            {
                let Some(first) = current.pop_front() else {
                    break;
                };
                total = total.saturating_sub(char_len(first) + joiner(current.len()));
            }
        }

        current.push_back(piece.as_str());
        total += len + joiner(current.len() - 1);
    }

    push_joined(&mut chunks, &current, &config.separator);
    chunks
}

fn push_joined(chunks: &mut Vec<String>, current: &VecDeque<&str>, separator: &str) {
    let joined = current.iter().copied().collect::<Vec<_>>().join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size,
            chunk_overlap,
            separator: "\n".to_string(),
        }
    }

    #[test]
    fn exact_size_text_without_newline_is_one_chunk() {
        let text = "x".repeat(1_000);
        let chunks = split_text(&text, &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks, vec![text]);
    }

    #[test]
    fn lines_are_merged_with_overlap() {
        let chunks = split_text("abc\ndef\nghi\njkl", &config(10, 4)).unwrap();
        assert_eq!(chunks, vec!["abc\ndef", "def\nghi", "ghi\njkl"]);
    }

    #[test]
    fn chunks_never_exceed_chunk_size() {
        let text = (0..200)
            .map(|line| format!("line {line} with a few words of filler text"))
            .collect::<Vec<_>>()
            .join("\n");

        let chunks = split_text(&text, &ChunkingConfig::default()).unwrap();
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|chunk| chunk.chars().count() <= 1_000));
    }

    #[test]
    fn overlong_line_is_windowed() {
        let chunks = split_text("abcdefghijklmno", &config(10, 4)).unwrap();
        assert_eq!(chunks, vec!["abcdefghij", "ghijklmno"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let text = "é".repeat(1_000);
        let chunks = split_text(&text, &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn blank_text_yields_no_chunks() {
        let chunks = split_text("\n\n  \n", &ChunkingConfig::default()).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn splitting_is_deterministic() {
        let text = "alpha\nbeta\ngamma\ndelta\nepsilon".repeat(50);
        let first = split_text(&text, &config(64, 16)).unwrap();
        let second = split_text(&text, &config(64, 16)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn overlap_larger_than_size_is_rejected() {
        let result = split_text("text", &config(10, 20));
        assert!(matches!(result, Err(IngestError::InvalidChunkConfig(_))));
    }
}
