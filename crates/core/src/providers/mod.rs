pub mod ollama;

pub use ollama::{OllamaChatModel, OllamaConfig, OllamaEmbedder};
