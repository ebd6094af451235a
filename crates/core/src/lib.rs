pub mod chain;
pub mod chunking;
pub mod embeddings;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod memory;
pub mod models;
pub mod providers;
pub mod session;
pub mod store;
pub mod traits;

pub use chain::{ConversationalChain, DEFAULT_TOP_K};
pub use chunking::{split_text, ChunkingConfig};
pub use embeddings::{CharacterNgramEmbedder, Embedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{ChatError, IngestError};
pub use extractor::{extract_raw_text, LopdfExtractor, PageText, PdfExtractor};
pub use ingest::{ingest_documents, IngestionReport};
pub use memory::ConversationMemory;
pub use models::{ChainAnswer, ChatMessage, IngestionOptions, RetrievedChunk, Role, UploadedPdf};
pub use providers::{OllamaChatModel, OllamaConfig, OllamaEmbedder};
pub use session::{
    ChatSession, SessionHandle, SessionStore, DEFAULT_MAX_SESSIONS, DEFAULT_SESSION_ID,
};
pub use store::InMemoryIndex;
pub use traits::{ChatModel, VectorIndex};
