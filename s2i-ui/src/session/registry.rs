//! Registry of open session stores
//!
//! Defines the initialization and teardown boundary per session. A
//! teardown always clears the store before dropping the registry
//! entry so no listener can observe stale slices afterwards.

use crate::session::store::SessionStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Open sessions keyed by converter session id
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Arc<SessionStore>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly opened session, replacing any stale entry
    /// with the same id
    pub async fn insert(&self, store: Arc<SessionStore>) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(store.session_id().to_string(), store);
    }

    pub async fn get(&self, session_id: &str) -> Option<Arc<SessionStore>> {
        self.sessions.read().await.get(session_id).cloned()
    }

    /// Tear down one session: clear its slices, then drop the entry
    pub async fn close(&self, session_id: &str) -> bool {
        let removed = {
            let mut sessions = self.sessions.write().await;
            sessions.remove(session_id)
        };
        match removed {
            Some(store) => {
                store.clear().await;
                tracing::info!(session_id = %session_id, "Session store torn down");
                true
            }
            None => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
