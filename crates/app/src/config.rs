use clap::{Parser, ValueEnum};
use pdf_chat_core::{IngestionOptions, OllamaConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmbedderKind {
    /// Embeddings from the Ollama embeddings endpoint.
    Ollama,
    /// Local character-trigram hashing, no model required.
    Ngram,
}

#[derive(Debug, Parser)]
#[command(name = "pdf-chat-server", version)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "PDF_CHAT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PDF_CHAT_PORT", default_value = "5000")]
    pub port: u16,

    /// HTML page served at `/`
    #[arg(long, env = "PDF_CHAT_INDEX_HTML", default_value = "index.html")]
    pub index_html: PathBuf,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_BASE_URL", default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Ollama model used for embeddings
    #[arg(long, env = "OLLAMA_EMBED_MODEL", default_value = "llama2")]
    pub embed_model: String,

    /// Ollama model used for answers
    #[arg(long, env = "OLLAMA_CHAT_MODEL", default_value = "llama2")]
    pub chat_model: String,

    /// Embedding backend
    #[arg(long, env = "PDF_CHAT_EMBEDDER", value_enum, default_value_t = EmbedderKind::Ollama)]
    pub embedder: EmbedderKind,

    /// Maximum characters per chunk
    #[arg(long, env = "PDF_CHAT_CHUNK_SIZE", default_value = "1000")]
    pub chunk_size: usize,

    /// Characters shared between neighbouring chunks
    #[arg(long, env = "PDF_CHAT_CHUNK_OVERLAP", default_value = "200")]
    pub chunk_overlap: usize,

    /// Chunks retrieved per question
    #[arg(long, env = "PDF_CHAT_TOP_K", default_value = "4")]
    pub top_k: usize,

    /// Upper bound for one upload request body
    #[arg(long, env = "PDF_CHAT_MAX_UPLOAD_BYTES", default_value = "52428800")]
    pub max_upload_bytes: usize,

    /// Sessions kept in memory before the least recently used is evicted
    #[arg(long, env = "PDF_CHAT_MAX_SESSIONS", default_value = "1000")]
    pub max_sessions: usize,

    /// Timeout for each Ollama request
    #[arg(long, env = "PDF_CHAT_REQUEST_TIMEOUT_SECS", default_value = "300")]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn ollama_config(&self) -> OllamaConfig {
        OllamaConfig {
            base_url: self.ollama_url.clone(),
            embed_model: self.embed_model.clone(),
            chat_model: self.chat_model.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn ingestion_options(&self) -> IngestionOptions {
        IngestionOptions {
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            top_k: self.top_k,
            ..IngestionOptions::default()
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
