// src/storage/memory.rs

//! In-memory session storage for tests and short-lived processes.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::StoredSession;
use crate::storage::SessionStorage;

#[derive(Debug, Default)]
pub struct MemoryStorage {
    session: Mutex<Option<StoredSession>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing session.
    pub fn with_session(session: StoredSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn load(&self) -> Result<Option<StoredSession>> {
        Ok(self.session.lock().await.clone())
    }

    async fn save(&self, session: &StoredSession) -> Result<()> {
        *self.session.lock().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.session.lock().await = None;
        Ok(())
    }
}
