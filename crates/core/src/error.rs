use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("no text could be extracted from the uploaded PDF(s)")]
    EmptyText,

    #[error("embedding failed: {0}")]
    Embedding(#[from] ChatError),

    #[error("pdf extraction task failed: {0}")]
    Task(String),
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding dimension {actual} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding count {embeddings} doesn't match chunk count {chunks}")]
    CountMismatch { chunks: usize, embeddings: usize },

    #[error("vector index is empty")]
    EmptyIndex,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
