use crate::chain::ConversationalChain;
use crate::chunking::{split_text, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::extractor::{extract_raw_text, PdfExtractor};
use crate::store::InMemoryIndex;
use crate::{IngestError, IngestionOptions, UploadedPdf};
use std::sync::Arc;
use tracing::info;

pub struct IngestionReport {
    pub chain: ConversationalChain,
    pub chunk_count: usize,
}

/// Runs extraction, chunking, embedding and indexing for one upload and
/// returns a fresh chain over the new index. Nothing is shared with any
/// previously built chain.
pub async fn ingest_documents(
    files: Vec<UploadedPdf>,
    extractor: Arc<dyn PdfExtractor>,
    embedder: &dyn Embedder,
    options: &IngestionOptions,
) -> Result<IngestionReport, IngestError> {
    let file_count = files.len();
    let raw_text = tokio::task::spawn_blocking(move || extract_raw_text(extractor.as_ref(), &files))
        .await
        .map_err(|error| IngestError::Task(error.to_string()))??;

    let chunks = split_text(&raw_text, &ChunkingConfig::from(options))?;
    if chunks.is_empty() {
        return Err(IngestError::EmptyText);
    }

    let chunk_count = chunks.len();
    info!(files = file_count, chars = raw_text.chars().count(), chunk_count, "chunked upload");

    let embeddings = embedder.embed_documents(&chunks).await?;
    let index = InMemoryIndex::from_embeddings(chunks, embeddings)?;

    Ok(IngestionReport {
        chain: ConversationalChain::new(Arc::new(index), options.top_k),
        chunk_count,
    })
}
