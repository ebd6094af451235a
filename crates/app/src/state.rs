use pdf_chat_core::{ChatModel, Embedder, IngestionOptions, PdfExtractor, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    sessions: SessionStore,
    extractor: Arc<dyn PdfExtractor>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn ChatModel>,
    options: IngestionOptions,
    index_html: PathBuf,
}

impl AppState {
    pub fn new(
        extractor: Arc<dyn PdfExtractor>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn ChatModel>,
        options: IngestionOptions,
        index_html: PathBuf,
        max_sessions: usize,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                sessions: SessionStore::new(max_sessions),
                extractor,
                embedder,
                llm,
                options,
                index_html,
            }),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    pub fn extractor(&self) -> Arc<dyn PdfExtractor> {
        Arc::clone(&self.inner.extractor)
    }

    pub fn embedder(&self) -> &dyn Embedder {
        self.inner.embedder.as_ref()
    }

    pub fn llm(&self) -> &dyn ChatModel {
        self.inner.llm.as_ref()
    }

    pub fn options(&self) -> &IngestionOptions {
        &self.inner.options
    }

    pub fn index_html(&self) -> &PathBuf {
        &self.inner.index_html
    }
}
