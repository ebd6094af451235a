use crate::{ChatError, RetrievedChunk};
use async_trait::async_trait;

pub trait VectorIndex: Send + Sync {
    fn len(&self) -> usize;

    fn search(&self, query_vector: &[f32], top_k: usize)
        -> Result<Vec<RetrievedChunk>, ChatError>;
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError>;
}
