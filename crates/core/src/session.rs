use crate::chain::ConversationalChain;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_MAX_SESSIONS: usize = 1000;

/// State owned by one conversation: the chain built by the last successful
/// upload, if any.
#[derive(Default)]
pub struct ChatSession {
    chain: Option<ConversationalChain>,
}

impl ChatSession {
    pub fn chain_mut(&mut self) -> Option<&mut ConversationalChain> {
        self.chain.as_mut()
    }

    pub fn has_chain(&self) -> bool {
        self.chain.is_some()
    }

    /// Installs a new chain, dropping the previous index and its history.
    pub fn replace_chain(&mut self, chain: ConversationalChain) {
        self.chain = Some(chain);
    }
}

pub type SessionHandle = Arc<Mutex<ChatSession>>;

struct SessionEntry {
    handle: SessionHandle,
    last_used: AtomicU64,
}

/// Sessions by id, capped at `max_sessions`. Creating a session past the cap
/// evicts the one used least recently.
pub struct SessionStore {
    max_sessions: usize,
    clock: AtomicU64,
    sessions: RwLock<HashMap<String, SessionEntry>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            max_sessions: max_sessions.max(1),
            clock: AtomicU64::new(0),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(session_id)?;
        entry.last_used.store(self.tick(), Ordering::Relaxed);
        Some(Arc::clone(&entry.handle))
    }

    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        if let Some(existing) = self.get(session_id).await {
            return existing;
        }

        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get(session_id) {
            entry.last_used.store(self.tick(), Ordering::Relaxed);
            return Arc::clone(&entry.handle);
        }

        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_used.load(Ordering::Relaxed))
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            sessions.remove(&oldest);
            info!(session = %oldest, max_sessions = self.max_sessions, "evicted idle session");
        }

        let handle = SessionHandle::default();
        sessions.insert(
            session_id.to_string(),
            SessionEntry {
                handle: Arc::clone(&handle),
                last_used: AtomicU64::new(self.tick()),
            },
        );
        handle
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
