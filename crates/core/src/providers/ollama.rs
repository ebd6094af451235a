use crate::embeddings::Embedder;
use crate::traits::ChatModel;
use crate::ChatError;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const BACKEND: &str = "ollama";

#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub embed_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "llama2".to_string(),
            chat_model: "llama2".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl OllamaConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn client(&self) -> Result<Client, ChatError> {
        Ok(Client::builder().timeout(self.timeout).build()?)
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

async fn check_status(response: Response) -> Result<Response, ChatError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ChatError::BackendResponse {
        backend: BACKEND.to_string(),
        details: format!("{status} {body}").trim().to_string(),
    })
}

pub struct OllamaEmbedder {
    config: OllamaConfig,
    client: Client,
}

impl OllamaEmbedder {
    pub fn new(config: OllamaConfig) -> Result<Self, ChatError> {
        let client = config.client()?;
        Ok(Self { config, client })
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        let response = self
            .client
            .post(self.config.endpoint("api/embeddings"))
            .json(&EmbedRequest {
                model: &self.config.embed_model,
                prompt: text,
            })
            .send()
            .await?;

        let parsed: EmbedResponse = check_status(response).await?.json().await?;
        if parsed.embedding.is_empty() {
            return Err(ChatError::BackendResponse {
                backend: BACKEND.to_string(),
                details: format!("model {} returned an empty embedding", self.config.embed_model),
            });
        }
        Ok(parsed.embedding)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ChatError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed_one(text).await?);
        }
        debug!(count = embeddings.len(), model = %self.config.embed_model, "embedded documents");
        Ok(embeddings)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ChatError> {
        self.embed_one(text).await
    }
}

pub struct OllamaChatModel {
    config: OllamaConfig,
    client: Client,
}

impl OllamaChatModel {
    pub fn new(config: OllamaConfig) -> Result<Self, ChatError> {
        let client = config.client()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChatModel for OllamaChatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ChatError> {
        let response = self
            .client
            .post(self.config.endpoint("api/generate"))
            .json(&GenerateRequest {
                model: &self.config.chat_model,
                prompt,
                stream: false,
            })
            .send()
            .await?;

        let parsed: GenerateResponse = check_status(response).await?.json().await?;
        Ok(parsed.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Answers `requests` connections with a fixed status and JSON body and
    /// hands back the request bodies it received.
    async fn stub_backend(
        status: &'static str,
        body: &'static str,
        requests: usize,
    ) -> (String, JoinHandle<Vec<serde_json::Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            let mut received = Vec::new();
            for _ in 0..requests {
                let (mut stream, _) = listener.accept().await.unwrap();
                received.push(read_json_body(&mut stream).await);
                let reply = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            received
        });

        (base_url, server)
    }

    async fn read_json_body(stream: &mut TcpStream) -> serde_json::Value {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = stream.read(&mut chunk).await.unwrap();
            assert!(read > 0, "client closed before sending a full request");
            buffer.extend_from_slice(&chunk[..read]);

            let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let body_start = header_end + 4;
            if buffer.len() >= body_start + length {
                return serde_json::from_slice(&buffer[body_start..body_start + length]).unwrap();
            }
        }
    }

    fn config_for(base_url: String) -> OllamaConfig {
        OllamaConfig {
            base_url,
            embed_model: "nomic-embed-text".to_string(),
            chat_model: "mistral".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let config = OllamaConfig {
            base_url: "http://ollama:11434/".to_string(),
            ..OllamaConfig::default()
        };
        assert_eq!(config.endpoint("api/generate"), "http://ollama:11434/api/generate");
    }

    #[test]
    fn generate_request_disables_streaming() {
        let body = serde_json::to_value(GenerateRequest {
            model: "llama2",
            prompt: "hi",
            stream: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"model": "llama2", "prompt": "hi", "stream": false}));
    }

    #[tokio::test]
    async fn unreachable_backend_surfaces_http_error() {
        let config = OllamaConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_secs(2),
            ..OllamaConfig::default()
        };
        let model = OllamaChatModel::new(config).unwrap();
        let result = model.complete("hello").await;
        assert!(matches!(result, Err(ChatError::Http(_))));
    }

    #[tokio::test]
    async fn embeddings_are_parsed_per_text() {
        let (base_url, server) = stub_backend("200 OK", r#"{"embedding":[0.5,0.25,0.0]}"#, 2).await;
        let embedder = OllamaEmbedder::new(config_for(base_url)).unwrap();

        let vectors = embedder
            .embed_documents(&["first chunk".to_string(), "second chunk".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![0.5, 0.25, 0.0]; 2]);
        let requests = server.await.unwrap();
        assert_eq!(
            requests[0],
            serde_json::json!({"model": "nomic-embed-text", "prompt": "first chunk"})
        );
        assert_eq!(requests[1]["prompt"], "second chunk");
    }

    #[tokio::test]
    async fn empty_embedding_is_rejected() {
        let (base_url, server) = stub_backend("200 OK", r#"{"embedding":[]}"#, 1).await;
        let embedder = OllamaEmbedder::new(config_for(base_url)).unwrap();

        let error = embedder.embed_query("anything").await.unwrap_err();
        match error {
            ChatError::BackendResponse { backend, details } => {
                assert_eq!(backend, "ollama");
                assert!(details.contains("empty embedding"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn generate_returns_the_response_field() {
        let (base_url, server) =
            stub_backend("200 OK", r#"{"model":"mistral","response":"Two years.","done":true}"#, 1).await;
        let model = OllamaChatModel::new(config_for(base_url)).unwrap();

        let answer = model.complete("How long is the warranty?").await.unwrap();

        assert_eq!(answer, "Two years.");
        let requests = server.await.unwrap();
        assert_eq!(
            requests[0],
            serde_json::json!({"model": "mistral", "prompt": "How long is the warranty?", "stream": false})
        );
    }

    #[tokio::test]
    async fn server_error_becomes_backend_response() {
        let (base_url, server) =
            stub_backend("500 Internal Server Error", r#"{"error":"model 'mistral' not found"}"#, 1).await;
        let model = OllamaChatModel::new(config_for(base_url)).unwrap();

        let error = model.complete("hello").await.unwrap_err();
        match error {
            ChatError::BackendResponse { details, .. } => {
                assert!(details.starts_with("500"));
                assert!(details.contains("not found"));
            }
            other => panic!("unexpected error: {other}"),
        }
        server.await.unwrap();
    }
}
