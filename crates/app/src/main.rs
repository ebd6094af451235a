mod config;
mod error;
mod routes;
mod state;

use chrono::Utc;
use clap::Parser;
use config::{Cli, EmbedderKind};
use pdf_chat_core::{
    CharacterNgramEmbedder, Embedder, LopdfExtractor, OllamaChatModel, OllamaEmbedder,
};
use state::AppState;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    // A missing .env file is fine; everything has a default.
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pdf_chat_server=info,pdf_chat_core=info,tower_http=info".into()
            }),
        )
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let ollama = cli.ollama_config();

    let embedder: Arc<dyn Embedder> = match cli.embedder {
        EmbedderKind::Ollama => Arc::new(OllamaEmbedder::new(ollama.clone())?),
        EmbedderKind::Ngram => Arc::new(CharacterNgramEmbedder::default()),
    };
    let llm = Arc::new(OllamaChatModel::new(ollama.clone())?);

    if !cli.index_html.exists() {
        warn!(path = %cli.index_html.display(), "index page not found, serving built-in page");
    }

    let state = AppState::new(
        Arc::new(LopdfExtractor),
        embedder,
        llm,
        cli.ingestion_options(),
        cli.index_html.clone(),
        cli.max_sessions,
    );
    let app = routes::router(state, cli.max_upload_bytes);

    let address = cli.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        address = %address,
        ollama = %ollama.base_url,
        embedder = ?cli.embedder,
        chat_model = %ollama.chat_model,
        max_sessions = cli.max_sessions,
        "pdf-chat-server boot"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("pdf-chat-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
