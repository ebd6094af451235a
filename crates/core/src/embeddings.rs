use crate::error::ChatError;
use async_trait::async_trait;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 128;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ChatError>;

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ChatError>;
}

/// Offline embedder that hashes character trigrams into buckets. Good enough
/// for lexical overlap, and fully deterministic.
#[derive(Debug, Clone, Copy)]
pub struct CharacterNgramEmbedder {
    pub dimensions: usize,
}

impl Default for CharacterNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

#[async_trait]
impl Embedder for CharacterNgramEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ChatError> {
        Ok(texts
            .iter()
            .map(|text| trigram_histogram(text, self.dimensions))
            .collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        Ok(trigram_histogram(text, self.dimensions))
    }
}

fn trigram_histogram(text: &str, dimensions: usize) -> Vec<f32> {
    let mut buckets = vec![0f32; dimensions.max(1)];
    let chars = text.to_lowercase().chars().collect::<Vec<_>>();

    for trigram in chars.windows(3) {
        let mut encoded = [0u8; 4];
        let mut hash = FNV_OFFSET;
        for ch in trigram {
            for byte in ch.encode_utf8(&mut encoded).bytes() {
                hash = (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME);
            }
        }
        let slot = (hash % buckets.len() as u64) as usize;
        buckets[slot] += 1.0;
    }

    let norm = buckets.iter().map(|value| value * value).sum::<f32>().sqrt();
    if norm > 0.0 {
        buckets.iter_mut().for_each(|value| *value /= norm);
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::{CharacterNgramEmbedder, Embedder};

    #[tokio::test]
    async fn embedder_is_deterministic() {
        let embedder = CharacterNgramEmbedder::default();
        let first = embedder.embed_query("Hydraulic pressure and flow").await.unwrap();
        let second = embedder.embed_query("Hydraulic pressure and flow").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn embedder_outputs_configured_length() {
        let embedder = CharacterNgramEmbedder { dimensions: 32 };
        let vector = embedder.embed_query("abc").await.unwrap();
        assert_eq!(vector.len(), 32);
        let norm = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn text_shorter_than_a_trigram_is_all_zero() {
        let vector = CharacterNgramEmbedder::default().embed_query("ab").await.unwrap();
        assert!(vector.iter().all(|value| *value == 0.0));
    }

    #[tokio::test]
    async fn query_and_document_embeddings_agree() {
        let embedder = CharacterNgramEmbedder::default();
        let documents = embedder
            .embed_documents(&["warranty terms".to_string()])
            .await
            .unwrap();
        let query = embedder.embed_query("warranty terms").await.unwrap();
        assert_eq!(documents, vec![query]);
    }
}
