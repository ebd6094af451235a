use crate::error::ChatError;
use crate::models::RetrievedChunk;
use crate::traits::VectorIndex;

/// Exact nearest-neighbour index over squared L2 distance. Built once per
/// ingestion and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct InMemoryIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    text: String,
    vector: Vec<f32>,
}

impl InMemoryIndex {
    pub fn from_embeddings(
        chunks: Vec<String>,
        embeddings: Vec<Vec<f32>>,
    ) -> Result<Self, ChatError> {
        if chunks.len() != embeddings.len() {
            return Err(ChatError::CountMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or_default();
        if dimensions == 0 {
            return Err(ChatError::EmptyIndex);
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(text, vector)| {
                if vector.len() != dimensions {
                    return Err(ChatError::DimensionMismatch {
                        expected: dimensions,
                        actual: vector.len(),
                    });
                }
                Ok(IndexEntry { text, vector })
            })
            .collect::<Result<Vec<_>, ChatError>>()?;

        Ok(Self {
            dimensions,
            entries,
        })
    }
}

impl VectorIndex for InMemoryIndex {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn search(
        &self,
        query_vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<RetrievedChunk>, ChatError> {
        if query_vector.len() != self.dimensions {
            return Err(ChatError::DimensionMismatch {
                expected: self.dimensions,
                actual: query_vector.len(),
            });
        }

        let mut scored = self
            .entries
            .iter()
            .enumerate()
            .map(|(chunk_index, entry)| (chunk_index, squared_l2(&entry.vector, query_vector)))
            .collect::<Vec<_>>();

        // Stable sort keeps insertion order among equal distances.
        scored.sort_by(|left, right| left.1.total_cmp(&right.1));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(chunk_index, distance)| RetrievedChunk {
                chunk_index,
                text: self.entries[chunk_index].text.clone(),
                distance,
            })
            .collect())
    }
}

fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}
